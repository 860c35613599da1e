// tests/supervisor_restart.rs

//! Supervisor lifecycle: restart on matching changes, debounce coalescing,
//! indifference to irrelevant paths, terminal stop on shutdown.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Instant};

use watchrun::engine::supervisor::spawn_supervisor;
use watchrun::engine::ChangeEvent;
use watchrun_test_utils::builders::TaskSpecBuilder;
use watchrun_test_utils::init_tracing;

fn run_count(log: &Path) -> usize {
    fs::read_to_string(log)
        .map(|s| s.lines().filter(|l| *l == "run").count())
        .unwrap_or(0)
}

async fn wait_for_count(log: &Path, want: usize, within: Duration) {
    let deadline = Instant::now() + within;
    loop {
        if run_count(log) >= want {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "expected {want} runs, saw {} in {log:?}",
            run_count(log)
        );
        sleep(Duration::from_millis(20)).await;
    }
}

/// A command that records each launch and then stays alive until stopped.
fn marker_cmd(log: &Path) -> String {
    format!("echo run >> {}; exec sleep 30", log.display())
}

struct Setup {
    _dir: TempDir,
    root: PathBuf,
    log: PathBuf,
}

fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let log = root.join("runs.log");
    Setup {
        _dir: dir,
        root,
        log,
    }
}

#[tokio::test]
async fn matching_change_restarts_the_command() {
    init_tracing();
    let s = setup();

    let spec = TaskSpecBuilder::new("t", &marker_cmd(&s.log))
        .root(&s.root)
        .patterns(&["**/*.go"])
        .debounce(Duration::from_millis(50))
        .build();

    let (tx, rx) = mpsc::channel::<ChangeEvent>(1);
    let handle = spawn_supervisor(spec, rx);

    wait_for_count(&s.log, 1, Duration::from_secs(3)).await;

    tx.send(ChangeEvent {
        path: s.root.join("main.go"),
    })
    .await
    .unwrap();

    wait_for_count(&s.log, 2, Duration::from_secs(3)).await;

    drop(tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor did not finish after shutdown")
        .unwrap();
}

#[tokio::test]
async fn burst_of_events_collapses_into_one_restart() {
    init_tracing();
    let s = setup();

    let spec = TaskSpecBuilder::new("t", &marker_cmd(&s.log))
        .root(&s.root)
        .patterns(&["**/*.go"])
        .debounce(Duration::from_millis(200))
        .build();

    let (tx, rx) = mpsc::channel::<ChangeEvent>(1);
    let handle = spawn_supervisor(spec, rx);

    wait_for_count(&s.log, 1, Duration::from_secs(3)).await;

    // Two distinct matching events inside one debounce window: the second is
    // queued while the first is being handled and must be coalesced.
    tx.send(ChangeEvent {
        path: s.root.join("a.go"),
    })
    .await
    .unwrap();
    tx.send(ChangeEvent {
        path: s.root.join("b.go"),
    })
    .await
    .unwrap();

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(run_count(&s.log), 2, "initial run plus exactly one restart");

    drop(tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor did not finish after shutdown")
        .unwrap();
}

#[tokio::test]
async fn irrelevant_paths_do_not_restart() {
    init_tracing();
    let s = setup();

    let spec = TaskSpecBuilder::new("t", &marker_cmd(&s.log))
        .root(&s.root)
        .patterns(&["**/*.py"])
        .build();

    let (tx, rx) = mpsc::channel::<ChangeEvent>(1);
    let handle = spawn_supervisor(spec, rx);

    wait_for_count(&s.log, 1, Duration::from_secs(3)).await;

    tx.send(ChangeEvent {
        path: s.root.join("main.go"),
    })
    .await
    .unwrap();

    sleep(Duration::from_millis(400)).await;
    assert_eq!(run_count(&s.log), 1);

    drop(tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor did not finish after shutdown")
        .unwrap();
}

#[tokio::test]
async fn shutdown_kills_the_running_process() {
    init_tracing();
    let s = setup();

    let pidfile = s.root.join("pid");
    let cmd = format!(
        "echo $$ > {}; echo run >> {}; exec sleep 30",
        pidfile.display(),
        s.log.display()
    );

    let spec = TaskSpecBuilder::new("t", &cmd).root(&s.root).build();

    let (tx, rx) = mpsc::channel::<ChangeEvent>(1);
    let handle = spawn_supervisor(spec, rx);

    wait_for_count(&s.log, 1, Duration::from_secs(3)).await;
    let pid = fs::read_to_string(&pidfile).unwrap().trim().to_string();

    // Closing the channel is the shutdown signal: the supervisor must run a
    // terminal stop before finishing.
    drop(tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor did not finish after shutdown")
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let alive = Command::new("sh")
            .args(["-c", &format!("kill -0 {pid} 2>/dev/null")])
            .status()
            .map(|st| st.success())
            .unwrap_or(false);
        if !alive {
            break;
        }
        assert!(Instant::now() < deadline, "process outlived the shutdown");
        sleep(Duration::from_millis(20)).await;
    }
}

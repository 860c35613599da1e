// tests/watcher_events.rs

//! End-to-end watcher behaviour against a real filesystem: change events for
//! writes, dynamic registration of created directories, silence on removals.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Instant};

use watchrun::engine::RouterEvent;
use watchrun::watch::spawn_watcher;
use watchrun_test_utils::init_tracing;

async fn expect_change(rx: &mut mpsc::Receiver<RouterEvent>, want: &Path, within: Duration) {
    let deadline = Instant::now() + within;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, rx.recv()).await {
            Ok(Some(RouterEvent::Change(change))) if change.path == want => return,
            Ok(Some(_)) => continue,
            Ok(None) => panic!("event channel closed while waiting for {want:?}"),
            Err(_) => panic!("no change event for {want:?}"),
        }
    }
}

async fn expect_no_change_for(
    rx: &mut mpsc::Receiver<RouterEvent>,
    unwanted: &Path,
    within: Duration,
) {
    let deadline = Instant::now() + within;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, rx.recv()).await {
            Ok(Some(RouterEvent::Change(change))) if change.path == unwanted => {
                panic!("unexpected change event for {unwanted:?}")
            }
            Ok(Some(_)) => continue,
            Ok(None) => return,
            Err(_) => return,
        }
    }
}

fn watch_root() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

#[tokio::test]
async fn write_produces_a_change_event() {
    init_tracing();
    let (_dir, root) = watch_root();

    let (events_tx, mut events_rx) = mpsc::channel::<RouterEvent>(8);
    spawn_watcher(vec![root.clone()], 2, events_tx).unwrap();

    // Give the backend a moment to establish the watches.
    sleep(Duration::from_millis(200)).await;

    let file = root.join("hello.txt");
    fs::write(&file, "hi").unwrap();

    expect_change(&mut events_rx, &file, Duration::from_secs(5)).await;
}

#[tokio::test]
async fn created_directories_are_watched_dynamically() {
    init_tracing();
    let (_dir, root) = watch_root();

    let (events_tx, mut events_rx) = mpsc::channel::<RouterEvent>(8);
    spawn_watcher(vec![root.clone()], 2, events_tx).unwrap();

    sleep(Duration::from_millis(200)).await;

    // The subdirectory did not exist at startup; a write inside it is only
    // seen if the creation registered it.
    let sub = root.join("sub");
    fs::create_dir(&sub).unwrap();
    sleep(Duration::from_millis(300)).await;

    let file = sub.join("inner.txt");
    fs::write(&file, "nested").unwrap();

    expect_change(&mut events_rx, &file, Duration::from_secs(5)).await;
}

#[tokio::test]
async fn removals_produce_no_change_event() {
    init_tracing();
    let (_dir, root) = watch_root();

    let (events_tx, mut events_rx) = mpsc::channel::<RouterEvent>(8);
    spawn_watcher(vec![root.clone()], 2, events_tx).unwrap();

    sleep(Duration::from_millis(200)).await;

    let file = root.join("doomed.txt");
    fs::write(&file, "soon gone").unwrap();
    expect_change(&mut events_rx, &file, Duration::from_secs(5)).await;

    fs::remove_file(&file).unwrap();
    expect_no_change_for(&mut events_rx, &file, Duration::from_millis(700)).await;
}

#[tokio::test]
async fn hidden_directories_are_not_watched() {
    init_tracing();
    let (_dir, root) = watch_root();

    let hidden = root.join(".cache");
    fs::create_dir(&hidden).unwrap();

    let (events_tx, mut events_rx) = mpsc::channel::<RouterEvent>(8);
    spawn_watcher(vec![root.clone()], 3, events_tx).unwrap();

    sleep(Duration::from_millis(200)).await;

    let file = hidden.join("blob.bin");
    fs::write(&file, "x").unwrap();

    expect_no_change_for(&mut events_rx, &file, Duration::from_millis(700)).await;
}

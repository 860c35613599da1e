// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{CliArgs, CliCommand};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{build_task_specs, drain_events, RouterEvent};
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - per-task supervisors and the event fan-out
/// - the file watcher
/// - SIGINT/SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    if let Some(CliCommand::Init) = args.command {
        return config::init::initialize_config();
    }

    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // Patterns and watch paths are evaluated against the config's directory.
    let root = config_root_dir(&config_path);
    let root = root.canonicalize().unwrap_or(root);

    let specs = build_task_specs(&cfg, &root)?;
    let (events_tx, supervisors) = drain_events(specs);

    let watch_roots: Vec<PathBuf> = cfg
        .watch
        .paths
        .iter()
        .map(|p| {
            let joined = root.join(p);
            joined.canonicalize().unwrap_or(joined)
        })
        .collect();
    watch::spawn_watcher(watch_roots, cfg.effective_depth(), events_tx.clone())?;

    spawn_signal_listener(events_tx);

    // The shutdown path: the signal listener stops the fan-out, the fan-out
    // closes every supervisor's channel, and each supervisor finishes its
    // terminal stop before its handle resolves. Only then do we exit.
    for handle in supervisors {
        if let Err(err) = handle.await {
            warn!(error = %err, "supervisor task panicked");
        }
    }

    info!("all tasks stopped");
    Ok(())
}

/// Figure out a sensible project root for watching.
///
/// - If the config path has a non-empty parent (e.g. "configs/Watchrun.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchrun.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn spawn_signal_listener(events_tx: mpsc::Sender<RouterEvent>) {
    tokio::spawn(async move {
        let caught = wait_for_signal().await;
        info!(signal = caught, "caught signal; shutting down");
        let _ = events_tx.send(RouterEvent::Shutdown).await;
    });
}

async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            }
        }
        Err(err) => {
            warn!(error = %err, "cannot listen for SIGTERM; handling Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

/// Simple dry-run output: print tasks, patterns and commands.
fn print_dry_run(cfg: &ConfigFile) {
    println!("watchrun dry-run");
    if let Some(ref desc) = cfg.description {
        println!("  desc: {desc}");
    }
    println!("  watch.paths = {:?}", cfg.watch.paths);
    println!("  watch.depth = {}", cfg.effective_depth());
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.patterns.is_empty() {
            println!("      patterns: {:?}", task.patterns);
        }
        if !task.env.is_empty() {
            println!("      env: {:?}", task.env);
        }
        if task.shell {
            println!("      shell: true");
        }
        println!("      debounce: {}", task.effective_debounce());
        println!("      stop_timeout: {}", task.effective_stop_timeout());
        println!("      signal: {}", task.effective_signal());
        println!("      kill_signal: {}", task.effective_kill_signal());
    }
}

// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use nix::errno::Errno;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{ChangeEvent, RouterEvent};
use crate::errors::{Result, WatchrunError};
use crate::watch::detector::ChangeDetector;
use crate::watch::scan::{is_excluded_dir_name, list_all_directories};
use crate::watch::WatchSet;

/// Register `roots` and their subdirectories, up to `depth` levels below each
/// root, with the OS notification primitive.
///
/// Directories are registered non-recursively so that depth limits and the
/// hidden/dependency-cache skips in [`list_all_directories`] are enforced by
/// our own walk instead of the backend.
///
/// `visited` is mutated in place, so repeated calls (dynamic add-on-create)
/// never re-register the same directory. Registration failures are logged as
/// warnings and the walk continues; running out of watch descriptors is
/// fatal.
pub fn watch_path_and_children(
    watcher: &mut RecommendedWatcher,
    roots: &[PathBuf],
    depth: usize,
    visited: &mut WatchSet,
) -> Result<()> {
    for root in roots {
        if visited.contains(root) {
            continue;
        }
        watch_dir(watcher, root, visited)?;

        let dirs = match list_all_directories(root, depth) {
            Ok(dirs) => dirs,
            Err(err) => {
                warn!(root = ?root, depth, error = %err, "listing directories failed");
                continue;
            }
        };
        for dir in dirs {
            watch_dir(watcher, &dir, visited)?;
        }
    }
    Ok(())
}

fn watch_dir(
    watcher: &mut RecommendedWatcher,
    dir: &Path,
    visited: &mut WatchSet,
) -> Result<()> {
    if visited.contains(dir) {
        return Ok(());
    }
    match watcher.watch(dir, RecursiveMode::NonRecursive) {
        Ok(()) => {
            debug!(dir = ?dir, "watch directory");
            visited.insert(dir.to_path_buf());
            Ok(())
        }
        Err(err) if is_watch_limit(&err) => Err(WatchrunError::WatchLimit {
            path: dir.to_path_buf(),
            source: err,
        }),
        Err(err) => {
            warn!(dir = ?dir, error = %err, "watch directory failed");
            Ok(())
        }
    }
}

fn is_watch_limit(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::MaxFilesWatch => true,
        notify::ErrorKind::Io(io) => io.raw_os_error() == Some(Errno::EMFILE as i32),
        _ => false,
    }
}

/// Start watching `roots` and forward coalesced change events into the
/// router's global channel.
///
/// This registers the initial directory tree (fatal on watch-descriptor
/// exhaustion) and then spawns the notification-translation task, which owns
/// the backend watcher, the [`WatchSet`] and the [`ChangeDetector`] for the
/// rest of the run. At runtime it:
///
/// - registers newly created directories (recursively, treating the new
///   directory as a fresh root with the configured depth),
/// - drops registrations for removed paths,
/// - filters redundant notifications through the change detector,
/// - forwards everything else as a [`ChangeEvent`].
pub fn spawn_watcher(
    roots: Vec<PathBuf>,
    depth: usize,
    events_tx: mpsc::Sender<RouterEvent>,
) -> Result<()> {
    // Channel from the blocking notify callback into the async world. The
    // error stream rides along so notification-layer failures surface in the
    // same loop.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if raw_tx.send(res).is_err() {
                // Tracing may not reach anyone from this thread once the
                // translation task is gone; fall back to stderr.
                eprintln!("watchrun: dropping notification, translation task is gone");
            }
        },
        Config::default(),
    )?;

    let mut visited = WatchSet::new();
    watch_path_and_children(&mut watcher, &roots, depth, &mut visited)?;

    info!(roots = ?roots, depth, "file watcher started");

    tokio::spawn(async move {
        let mut detector = ChangeDetector::new();

        while let Some(res) = raw_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    error!(error = %err, "watch error");
                    continue;
                }
            };

            for path in &event.paths {
                if event.kind.is_create() && path.is_dir() {
                    if path
                        .file_name()
                        .is_some_and(|n| is_excluded_dir_name(&n.to_string_lossy()))
                    {
                        continue;
                    }
                    info!(dir = ?path, "add watch");
                    if let Err(err) = watch_path_and_children(
                        &mut watcher,
                        std::slice::from_ref(path),
                        depth,
                        &mut visited,
                    ) {
                        error!(error = %err, "cannot register new directory");
                        std::process::exit(1);
                    }
                    continue;
                }

                if event.kind.is_remove() {
                    if watcher.unwatch(path).is_ok() {
                        info!(dir = ?path, "remove watch");
                    }
                    visited.remove(path);
                    continue;
                }

                if !detector.is_changed(path) {
                    continue;
                }

                let change = ChangeEvent { path: path.clone() };
                if events_tx.send(RouterEvent::Change(change)).await.is_err() {
                    // Router has shut down; stop translating.
                    debug!("event channel closed; watcher loop finished");
                    return;
                }
            }
        }

        debug!("notification stream closed; watcher loop finished");
    });

    Ok(())
}

// src/engine/supervisor.rs

//! Per-task process supervision: the stop -> debounce -> restart cycle.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::engine::{ChangeEvent, TaskSpec};
use crate::exec::{ProcessHandle, ProcessSlot};

/// Spawn the supervising task for one configured task.
pub fn spawn_supervisor(spec: TaskSpec, events: mpsc::Receiver<ChangeEvent>) -> JoinHandle<()> {
    tokio::spawn(run_supervisor(spec, events))
}

/// Supervise one task for the lifetime of the program.
///
/// Launches the command immediately, then processes change events one at a
/// time: irrelevant paths are discarded, a relevant one stops the current run
/// (gracefully, escalating to a forced kill after the stop timeout), waits
/// out the debounce delay, coalesces whatever queued up during the burst, and
/// relaunches.
///
/// When the event channel closes (global shutdown), the stop signal is
/// promoted to the forced signal, a final stop runs, and the supervisor
/// exits. Processing is strictly one event at a time, so there is never more
/// than one in-flight restart sequence per task.
pub async fn run_supervisor(spec: TaskSpec, mut events: mpsc::Receiver<ChangeEvent>) {
    let mut slot = ProcessSlot::empty();
    launch(&spec, &mut slot);

    while let Some(event) = events.recv().await {
        if !spec.matcher.matches(&event.path) {
            continue;
        }

        info!(task = %spec.name, path = ?event.path, "changed");

        if !slot.stop(&spec.name, spec.stop_signal, spec.stop_timeout).await {
            // Forced kill dispatched; observe the exit before relaunching so
            // two runs never overlap.
            slot.await_exit(&spec.name).await;
        }

        debug!(task = %spec.name, delay = ?spec.debounce, "debounce");
        sleep(spec.debounce).await;
        drain_pending(&spec, &mut events);

        launch(&spec, &mut slot);
    }

    // Shutdown: no more events will arrive; stop with the forced signal.
    slot.stop(&spec.name, spec.exit_signal, spec.stop_timeout).await;
    debug!(task = %spec.name, "supervisor finished");
}

/// Discard events that queued up while stopping and debouncing, so a burst of
/// changes produces one restart, not one per event.
fn drain_pending(spec: &TaskSpec, events: &mut mpsc::Receiver<ChangeEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                debug!(task = %spec.name, path = ?event.path, "coalesced queued event");
            }
            Err(TryRecvError::Empty) => break,
            // Closure is observed by the main recv loop.
            Err(TryRecvError::Disconnected) => break,
        }
    }
}

fn launch(spec: &TaskSpec, slot: &mut ProcessSlot) {
    info!(task = %spec.name, argv = ?spec.argv, "exec start");
    match ProcessHandle::spawn(spec) {
        Ok(handle) => slot.replace(handle),
        Err(err) => {
            // Contained to this task: the supervisor stays ready for the
            // next change.
            error!(task = %spec.name, error = %err, "failed to start command");
        }
    }
}

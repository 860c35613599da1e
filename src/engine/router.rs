// src/engine/router.rs

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::supervisor;
use crate::engine::{ChangeEvent, RouterEvent, TaskSpec};

/// Capacity of the global channel and of each task's private channel.
///
/// A slow consumer keeps at most one extra event queued and then
/// backpressures the producer.
const EVENT_BUFFER: usize = 1;

/// Wire up the event fan-out: one private channel plus one supervisor per
/// task, and a broadcast task that copies every change event from the global
/// channel to every private channel.
///
/// Every task sees every event and decides relevance itself through its
/// matcher; this is a broadcast, not load-balanced dispatch. When a
/// [`RouterEvent::Shutdown`] arrives (or the global channel closes), the
/// private channels are closed in turn, which tells each supervisor to run
/// its terminal stop and finish.
///
/// Returns the global sender and one join handle per supervisor; awaiting the
/// handles is how shutdown waits for every task's process to be dealt with.
pub fn drain_events(specs: Vec<TaskSpec>) -> (mpsc::Sender<RouterEvent>, Vec<JoinHandle<()>>) {
    let (global_tx, mut global_rx) = mpsc::channel::<RouterEvent>(EVENT_BUFFER);

    let mut task_txs = Vec::with_capacity(specs.len());
    let mut handles = Vec::with_capacity(specs.len());

    for spec in specs {
        let (task_tx, task_rx) = mpsc::channel::<ChangeEvent>(EVENT_BUFFER);
        task_txs.push(task_tx);
        handles.push(supervisor::spawn_supervisor(spec, task_rx));
    }

    tokio::spawn(async move {
        while let Some(event) = global_rx.recv().await {
            match event {
                RouterEvent::Change(change) => {
                    for tx in &task_txs {
                        // A closed private channel means that supervisor is
                        // gone; keep fanning out to the rest.
                        let _ = tx.send(change.clone()).await;
                    }
                }
                RouterEvent::Shutdown => break,
            }
        }

        // Dropping the senders closes every private channel, signalling each
        // supervisor to run its terminal stop.
        drop(task_txs);
        debug!("event fan-out finished");
    });

    (global_tx, handles)
}

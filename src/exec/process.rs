// src/exec/process.rs

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::Context;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::engine::task::TaskSpec;
use crate::errors::Result;

/// A single spawned run of a task's command.
///
/// The child is owned by a background waiter task; the handle keeps the
/// process-group id for signalling and a one-slot channel that receives the
/// exit status exactly once.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Pid,
    started_at: Instant,
    exit_rx: oneshot::Receiver<ExitStatus>,
}

impl ProcessHandle {
    /// Spawn the task's command in its own process group, inheriting stdio.
    pub fn spawn(spec: &TaskSpec) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&spec.argv[0]);
        cmd.args(&spec.argv[1..])
            .envs(&spec.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            // Own process group, so stop signals reach the whole command
            // (shell and its children) rather than just the leader.
            .process_group(0)
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process for task '{}'", spec.name))?;
        let pid = child
            .id()
            .map(|id| Pid::from_raw(id as i32))
            .context("spawned child has no pid")?;

        let (exit_tx, exit_rx) = oneshot::channel();
        let name = spec.name.clone();
        let started_at = Instant::now();

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    info!(
                        task = %name,
                        elapsed = ?started_at.elapsed(),
                        "finished"
                    );
                    let _ = exit_tx.send(status);
                }
                Err(err) => {
                    // Dropping the sender closes the slot, which the stop
                    // path treats as "exited".
                    error!(task = %name, error = %err, "waiting for process failed");
                }
            }
        });

        Ok(Self {
            pid,
            started_at,
            exit_rx,
        })
    }

    /// Process-group id of this run.
    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }

    fn signal(&self, task: &str, sig: Signal) {
        if let Err(err) = signal::killpg(self.pid, sig) {
            warn!(task = %task, pid = self.pid.as_raw(), %sig, error = %err, "sending signal failed");
        }
    }
}

/// The at-most-one running process owned by a task supervisor.
#[derive(Debug, Default)]
pub struct ProcessSlot {
    current: Option<ProcessHandle>,
}

impl ProcessSlot {
    pub fn empty() -> Self {
        Self { current: None }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Pid of the current run, if any.
    pub fn pid(&self) -> Option<i32> {
        self.current.as_ref().map(ProcessHandle::pid)
    }

    pub fn replace(&mut self, handle: ProcessHandle) {
        self.current = Some(handle);
    }

    /// Stop the current run: send `sig`, wait up to `timeout` for the exit
    /// status, escalate to SIGKILL on timeout.
    ///
    /// Returns true when the process is known to be gone (or there was none)
    /// and the slot has been cleared. Returns false when the timeout elapsed:
    /// the forced kill has been sent exactly once, but the exit has not been
    /// observed yet and the slot still holds the handle.
    pub async fn stop(&mut self, task: &str, sig: Signal, timeout: Duration) -> bool {
        let Some(handle) = self.current.as_mut() else {
            return true;
        };

        // The previous run may have exited on its own already.
        match handle.exit_rx.try_recv() {
            Ok(status) => {
                report_exit(task, status);
                self.current = None;
                return true;
            }
            Err(TryRecvError::Closed) => {
                self.current = None;
                return true;
            }
            Err(TryRecvError::Empty) => {}
        }

        handle.signal(task, sig);

        match time::timeout(timeout, &mut handle.exit_rx).await {
            Ok(Ok(status)) => {
                report_exit(task, status);
                self.current = None;
                true
            }
            Ok(Err(_closed)) => {
                self.current = None;
                true
            }
            Err(_elapsed) => {
                warn!(
                    task = %task,
                    alive_for = ?handle.started_at.elapsed(),
                    "program still alive; sending kill"
                );
                handle.signal(task, Signal::SIGKILL);
                false
            }
        }
    }

    /// Wait for the exit of a run whose forced kill was already dispatched,
    /// then clear the slot. Returns immediately when the slot is empty.
    pub async fn await_exit(&mut self, task: &str) {
        let Some(handle) = self.current.as_mut() else {
            return;
        };
        match (&mut handle.exit_rx).await {
            Ok(status) => report_exit(task, status),
            Err(_closed) => debug!(task = %task, "exit slot closed"),
        }
        self.current = None;
    }
}

fn report_exit(task: &str, status: ExitStatus) {
    if !status.success() {
        warn!(task = %task, %status, "program exited");
    }
}

// src/engine/task.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use nix::sys::signal::Signal;
use tracing::warn;

use crate::config::model::{parse_duration_field, ConfigFile};
use crate::engine::TaskName;
use crate::errors::{Result, WatchrunError};
use crate::exec::{resolve_shell, signal::parse_signal};
use crate::watch::patterns::TaskMatcher;

/// A task as the engine sees it: patterns compiled, command resolved into
/// argv, durations and signals parsed. Immutable after load.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: TaskName,
    pub matcher: TaskMatcher,
    pub argv: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub debounce: Duration,
    pub stop_timeout: Duration,
    /// Signal for the graceful stop on a matched change.
    pub stop_signal: Signal,
    /// Signal for the forced stop on shutdown.
    pub exit_signal: Signal,
}

/// Compile every configured task against `root`, the directory glob patterns
/// are evaluated relative to.
pub fn build_task_specs(cfg: &ConfigFile, root: &Path) -> Result<Vec<TaskSpec>> {
    let mut specs = Vec::with_capacity(cfg.task.len());

    for (name, task) in cfg.task.iter() {
        if task.patterns.is_empty() {
            warn!(task = %name, "task has no patterns and will never be retriggered");
        }
        let matcher = TaskMatcher::compile(root, name, &task.patterns)?;

        let argv = if task.shell {
            let shell = resolve_shell()?;
            vec![
                shell.to_string_lossy().into_owned(),
                "-c".to_string(),
                task.cmd.clone(),
            ]
        } else {
            let argv = shell_words::split(&task.cmd).map_err(|err| {
                WatchrunError::ConfigError(format!("task '{name}': cannot split cmd: {err}"))
            })?;
            if argv.is_empty() {
                return Err(WatchrunError::ConfigError(format!(
                    "task '{name}': no command defined"
                )));
            }
            argv
        };

        let debounce = parse_duration_field(name, "debounce", task.effective_debounce())?;
        let stop_timeout =
            parse_duration_field(name, "stop_timeout", task.effective_stop_timeout())?;

        let stop_signal = parse_signal(task.effective_signal())
            .map_err(|err| WatchrunError::ConfigError(format!("task '{name}': {err}")))?;
        let exit_signal = parse_signal(task.effective_kill_signal())
            .map_err(|err| WatchrunError::ConfigError(format!("task '{name}': {err}")))?;

        specs.push(TaskSpec {
            name: name.clone(),
            matcher,
            argv,
            env: task.env.clone(),
            debounce,
            stop_timeout,
            stop_signal,
            exit_signal,
        });
    }

    Ok(specs)
}

// src/config/validate.rs

use std::path::Path;

use crate::config::model::{parse_duration_field, ConfigFile, RawConfigFile, TaskConfig};
use crate::errors::{Result, WatchrunError};
use crate::exec::{resolve_shell, signal::parse_signal};
use crate::watch::patterns::TaskMatcher;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    for (name, task) in cfg.task.iter() {
        validate_task(name, task)?;
    }
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(WatchrunError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task(name: &str, task: &TaskConfig) -> Result<()> {
    validate_command(name, task)?;

    parse_duration_field(name, "debounce", task.effective_debounce())?;
    parse_duration_field(name, "stop_timeout", task.effective_stop_timeout())?;

    parse_signal(task.effective_signal())
        .map_err(|err| WatchrunError::ConfigError(format!("task '{name}': {err}")))?;
    parse_signal(task.effective_kill_signal())
        .map_err(|err| WatchrunError::ConfigError(format!("task '{name}': {err}")))?;

    // Compile the pattern set once here so malformed globs surface at load
    // time, never at match time. The root is irrelevant for validity.
    TaskMatcher::compile(Path::new("."), name, &task.patterns)?;

    Ok(())
}

fn validate_command(name: &str, task: &TaskConfig) -> Result<()> {
    if task.cmd.trim().is_empty() {
        return Err(WatchrunError::ConfigError(format!(
            "task '{name}' has an empty cmd"
        )));
    }

    if task.shell {
        // The interpreter must exist before watching begins.
        resolve_shell()?;
    } else {
        let argv = shell_words::split(&task.cmd).map_err(|err| {
            WatchrunError::ConfigError(format!("task '{name}': cannot split cmd: {err}"))
        })?;
        if argv.is_empty() {
            return Err(WatchrunError::ConfigError(format!(
                "task '{name}': no command defined"
            )));
        }
    }

    Ok(())
}

// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WatchrunError};

/// Fallback debounce delay between stopping the previous run and starting the
/// next one.
pub const DEFAULT_DEBOUNCE: &str = "100ms";

/// Fallback wait for a process to exit after the graceful stop signal.
pub const DEFAULT_STOP_TIMEOUT: &str = "500ms";

/// Fallback stop signal name.
pub const DEFAULT_SIGNAL: &str = "KILL";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// desc = "rebuild on change"
///
/// [watch]
/// paths = ["."]
/// depth = 3
///
/// [task.test]
/// cmd = "cargo test"
/// patterns = ["**/*.rs", "!target/**"]
/// shell = true
/// ```
///
/// All sections except `[task.<name>]` are optional and have reasonable
/// defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfigFile {
    /// Free-form description, carried along for humans.
    #[serde(default, rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Root paths and recursion depth from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// All tasks from `[task.<name>]`.
    ///
    /// Keys are the *task names* (e.g. `"test"`, `"build"`).
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[watch]` section: which directories to register and how deep to descend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchSection {
    /// Root directories to watch. Defaults to the project root itself.
    #[serde(default = "default_watch_paths")]
    pub paths: Vec<String>,

    /// How many directory levels below each root to register.
    ///
    /// Negative values are normalized to 0 (only the roots themselves).
    #[serde(default)]
    pub depth: i64,
}

fn default_watch_paths() -> Vec<String> {
    vec![".".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            paths: default_watch_paths(),
            depth: 0,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskConfig {
    /// The command to execute.
    pub cmd: String,

    /// Ignore-file style glob patterns routing changed paths to this task.
    ///
    /// `**` wildcards and `!` negation are supported; the last matching rule
    /// wins. A task with no patterns is never retriggered.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Environment variable overrides merged over the parent environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// If true, `cmd` is handed as-is to a resolved shell interpreter
    /// (`bash -c` / `sh -c`). Otherwise it is split into argv tokens.
    #[serde(default)]
    pub shell: bool,

    /// Debounce delay between stop and restart, e.g. `"100ms"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce: Option<String>,

    /// How long to wait for a voluntary exit after the stop signal, e.g.
    /// `"500ms"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_timeout: Option<String>,

    /// Signal used for the graceful stop (`TERM`, `SIGINT`, `9`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    /// Signal used for the forced stop on shutdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_signal: Option<String>,
}

impl TaskConfig {
    pub fn effective_debounce(&self) -> &str {
        self.debounce.as_deref().unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn effective_stop_timeout(&self) -> &str {
        self.stop_timeout.as_deref().unwrap_or(DEFAULT_STOP_TIMEOUT)
    }

    pub fn effective_signal(&self) -> &str {
        self.signal.as_deref().unwrap_or(DEFAULT_SIGNAL)
    }

    pub fn effective_kill_signal(&self) -> &str {
        self.kill_signal.as_deref().unwrap_or(DEFAULT_SIGNAL)
    }
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`), which
/// guarantees every task's command, durations, signals and patterns are
/// well-formed before any watching starts.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub description: Option<String>,
    pub watch: WatchSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Build a `ConfigFile` without re-running validation.
    ///
    /// Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            description: raw.description,
            watch: raw.watch,
            task: raw.task,
        }
    }

    /// Watch depth with negative values normalized to zero.
    pub fn effective_depth(&self) -> usize {
        self.watch.depth.max(0) as usize
    }
}

/// Parse a humantime duration string (`"100ms"`, `"2s"`) from a config field.
pub fn parse_duration_field(task: &str, field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).map_err(|err| {
        WatchrunError::ConfigError(format!(
            "task '{task}': invalid {field} duration '{value}': {err}"
        ))
    })
}

// src/exec/mod.rs

//! Process spawning, signalling and graceful/forced termination.

use std::path::PathBuf;

use crate::errors::{Result, WatchrunError};

pub mod process;
pub mod signal;

pub use process::{ProcessHandle, ProcessSlot};
pub use signal::parse_signal;

/// Resolve the shell interpreter used for `shell = true` tasks.
///
/// Prefers `bash`, falls back to `sh`. A missing interpreter is a
/// configuration error reported before watching begins.
pub fn resolve_shell() -> Result<PathBuf> {
    which::which("bash")
        .or_else(|_| which::which("sh"))
        .map_err(|_| {
            WatchrunError::ConfigError("could not find bash or sh on PATH".to_string())
        })
}

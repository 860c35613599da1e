// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The OS refused further watch registrations (file-descriptor or
    /// inotify limit). Fatal: the tool never continues with partial coverage.
    #[error("watch limit reached while registering {path:?}: {source}")]
    WatchLimit {
        path: PathBuf,
        source: notify::Error,
    },

    #[error(transparent)]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WatchrunError>;

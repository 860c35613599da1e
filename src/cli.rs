// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `watchrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchrun",
    version,
    about = "Watch files and (re)run commands when they change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Watchrun.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Watchrun.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the effective tasks, but don't watch or execute.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Subcommands. With no subcommand, `watchrun` starts watching.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Interactively generate a starter `Watchrun.toml`.
    Init,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

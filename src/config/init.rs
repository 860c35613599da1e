// src/config/init.rs

//! Interactive generation of a starter `Watchrun.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::Context;
use regex::Regex;

use crate::config::loader::default_config_path;
use crate::config::model::{ConfigFile, RawConfigFile, TaskConfig, WatchSection};
use crate::errors::Result;

/// Ask a few questions and write a starter configuration to `Watchrun.toml`.
///
/// Every prompt has a default so hitting enter three times yields a working
/// config. The generated config is validated before being written, so a bad
/// answer fails here instead of at the next start.
pub fn initialize_config() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let default_name = cwd
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let name = read_string(&mut input, "name", &default_name)?;
    let command = read_string(&mut input, "command", "cargo test")?;
    let pattern_line = read_string(&mut input, "patterns (comma separated)", "**/*.rs")?;

    let splitter = Regex::new(r",\s*").map_err(anyhow::Error::from)?;
    let patterns: Vec<String> = splitter
        .split(&pattern_line)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();

    let raw = RawConfigFile {
        description: Some(format!("Generated by watchrun [{name}]")),
        watch: WatchSection {
            paths: vec![".".to_string()],
            depth: 3,
        },
        task: BTreeMap::from([(
            name,
            TaskConfig {
                cmd: command,
                patterns,
                env: BTreeMap::new(),
                shell: true,
                debounce: None,
                stop_timeout: None,
                signal: Some("TERM".to_string()),
                kill_signal: None,
            },
        )]),
    };

    // Run the answers through the same validation as a normal load.
    ConfigFile::try_from(raw.clone())?;

    let data = toml::to_string_pretty(&raw)
        .map_err(|err| anyhow::anyhow!("serializing config: {err}"))?;
    let path = default_config_path();
    fs::write(&path, data).with_context(|| format!("writing {path:?}"))?;

    println!("Saved to {path:?}");
    Ok(())
}

fn read_string(input: &mut impl BufRead, prompt: &str, default: &str) -> Result<String> {
    print!("[?] {prompt} ({default}): ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

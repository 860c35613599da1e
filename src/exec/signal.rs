// src/exec/signal.rs

use nix::sys::signal::Signal;

/// Parse a signal name from configuration.
///
/// Accepts the short names used in config files (`TERM`, `KILL`, ...), their
/// `SIG`-prefixed aliases (`SIGTERM`) and raw numbers (`15`).
pub fn parse_signal(name: &str) -> Result<Signal, String> {
    let trimmed = name.trim();

    if let Ok(num) = trimmed.parse::<i32>() {
        return Signal::try_from(num).map_err(|_| format!("unknown signal number {num}"));
    }

    let upper = trimmed.to_uppercase();
    let bare = upper.strip_prefix("SIG").unwrap_or(&upper);

    match bare {
        "INT" => Ok(Signal::SIGINT),
        "HUP" => Ok(Signal::SIGHUP),
        "QUIT" => Ok(Signal::SIGQUIT),
        "TRAP" => Ok(Signal::SIGTRAP),
        "TERM" => Ok(Signal::SIGTERM),
        "KILL" => Ok(Signal::SIGKILL),
        other => Err(format!("unknown signal name '{other}'")),
    }
}

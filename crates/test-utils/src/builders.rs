use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use watchrun::engine::TaskSpec;
use watchrun::exec::parse_signal;
use watchrun::watch::TaskMatcher;

/// Builder for [`TaskSpec`]s used in integration tests.
///
/// The command is always shell-wrapped through `sh -c`, which is what most
/// test commands want anyway. Defaults are tuned for fast tests: a 50ms
/// debounce, a 500ms stop timeout, TERM/KILL signals and a match-everything
/// pattern.
pub struct TaskSpecBuilder {
    name: String,
    cmd: String,
    patterns: Vec<String>,
    root: PathBuf,
    env: BTreeMap<String, String>,
    debounce: Duration,
    stop_timeout: Duration,
    stop_signal: String,
    exit_signal: String,
}

impl TaskSpecBuilder {
    pub fn new(name: &str, cmd: &str) -> Self {
        Self {
            name: name.to_string(),
            cmd: cmd.to_string(),
            patterns: vec!["**/*".to_string()],
            root: PathBuf::from("."),
            env: BTreeMap::new(),
            debounce: Duration::from_millis(50),
            stop_timeout: Duration::from_millis(500),
            stop_signal: "TERM".to_string(),
            exit_signal: "KILL".to_string(),
        }
    }

    /// Directory the patterns are evaluated against.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn stop_signal(mut self, signal: &str) -> Self {
        self.stop_signal = signal.to_string();
        self
    }

    pub fn exit_signal(mut self, signal: &str) -> Self {
        self.exit_signal = signal.to_string();
        self
    }

    pub fn build(self) -> TaskSpec {
        let root = self.root.canonicalize().unwrap_or(self.root);
        let matcher = TaskMatcher::compile(&root, &self.name, &self.patterns)
            .expect("compiling test patterns");

        TaskSpec {
            name: self.name,
            matcher,
            argv: vec!["sh".to_string(), "-c".to_string(), self.cmd],
            env: self.env,
            debounce: self.debounce,
            stop_timeout: self.stop_timeout,
            stop_signal: parse_signal(&self.stop_signal).expect("stop signal"),
            exit_signal: parse_signal(&self.exit_signal).expect("exit signal"),
        }
    }
}

// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::errors::{Result, WatchrunError};

/// Compiled pattern set deciding whether a changed path is relevant to a task.
///
/// Patterns follow ignore-file semantics: `**` wildcards, `!` negation and
/// directory anchors, with the last matching rule winning. A path is relevant
/// when at least one non-negated pattern matches it and no later negation
/// overrides that.
///
/// Compiled once per task at configuration load; matching never fails.
#[derive(Clone)]
pub struct TaskMatcher {
    name: String,
    patterns: Gitignore,
}

impl fmt::Debug for TaskMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskMatcher")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TaskMatcher {
    /// Compile `patterns` relative to `root`.
    ///
    /// Any malformed pattern is a configuration error, reported here rather
    /// than at match time.
    pub fn compile(root: &Path, task: &str, patterns: &[String]) -> Result<TaskMatcher> {
        let mut builder = GitignoreBuilder::new(root);
        for pat in patterns {
            builder.add_line(None, pat).map_err(|err| {
                WatchrunError::ConfigError(format!(
                    "task '{task}': invalid pattern '{pat}': {err}"
                ))
            })?;
        }
        let compiled = builder.build().map_err(|err| {
            WatchrunError::ConfigError(format!("task '{task}': building pattern set: {err}"))
        })?;

        Ok(Self {
            name: task.to_string(),
            patterns: compiled,
        })
    }

    /// Name of the task this matcher belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task is interested in the given path.
    ///
    /// `path` may be absolute (under the compile root) or root-relative.
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.matched(path, path.is_dir()).is_ignore()
    }
}

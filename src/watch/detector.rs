// src/watch/detector.rs

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Minimum gap between two modification timestamps for them to count as
/// distinct changes.
pub const COALESCE_WINDOW: Duration = Duration::from_millis(100);

/// Collapses bursts of raw notifications into one logical change per path.
///
/// A single editor save often produces several notifications (write, chmod,
/// rename); only the first one whose modification time moved past the
/// coalescing window is reported as a change.
///
/// Accessed only from the single notification-translation task, so no
/// synchronization is needed.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_seen: HashMap<PathBuf, SystemTime>,
    window: Duration,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::with_window(COALESCE_WINDOW)
    }

    /// Detector with a custom coalescing window, mainly for tests.
    pub fn with_window(window: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            window,
        }
    }

    /// Whether `path` changed meaningfully since the last observation.
    ///
    /// A path that no longer exists is reported as changed without updating
    /// state, so deleted files still trigger. First observations always
    /// report changed (the stored time defaults to the epoch).
    pub fn is_changed(&mut self, path: &Path) -> bool {
        let Ok(meta) = fs::metadata(path) else {
            return true;
        };
        let Ok(mtime) = meta.modified() else {
            return true;
        };

        let last = self
            .last_seen
            .get(path)
            .copied()
            .unwrap_or(SystemTime::UNIX_EPOCH);

        match mtime.duration_since(last) {
            Ok(elapsed) if elapsed > self.window => {
                self.last_seen.insert(path.to_path_buf(), mtime);
                true
            }
            _ => false,
        }
    }
}

// src/watch/scan.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Conventional dependency-cache folder, always skipped.
const DEPENDENCY_CACHE_DIR: &str = "node_modules";

/// Whether a directory name is excluded from watching: hidden directories and
/// the dependency-cache folder, each with their whole subtree.
pub fn is_excluded_dir_name(name: &str) -> bool {
    name.starts_with('.') || name == DEPENDENCY_CACHE_DIR
}

/// List every directory under `root`, at most `max_depth` levels below it.
///
/// The root itself is not included. Hidden directories (name starting with
/// `.`) and the dependency-cache folder are skipped together with their whole
/// subtrees. Symlinked directories are not followed.
pub fn list_all_directories(root: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    collect_dirs(root, 0, max_depth, &mut dirs)?;
    Ok(dirs)
}

fn collect_dirs(
    dir: &Path,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    // Children of `dir` would sit at `depth + 1`.
    if depth >= max_depth {
        return Ok(());
    }

    let entries = fs::read_dir(dir).with_context(|| format!("reading dir {dir:?}"))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {dir:?}"))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {:?}", entry.path()))?;
        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        if is_excluded_dir_name(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        out.push(path.clone());
        collect_dirs(&path, depth + 1, max_depth, out)?;
    }

    Ok(())
}

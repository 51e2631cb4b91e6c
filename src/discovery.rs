//! Expansion of glob patterns into the list of files to process

use crate::backup_guard::{is_backup_path, original_for_backup, BACKUP_SUFFIX};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Patterns used when none are given on the command line or in a profile
pub const DEFAULT_PATTERNS: [&str; 4] = ["src/*.cpp", "src/*.h", "tools/**/*.cpp", "tools/**/*.h"];

/// Expand `patterns` relative to `root` into regular files.
///
/// Files come out in pattern order, each pattern's matches sorted by path, and
/// a file matched by several patterns is listed once. Backup files are never
/// returned. Unreadable directory entries are logged and skipped; an invalid
/// pattern is an error.
pub fn expand_patterns<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched = 0usize;

        for path in glob_files(root, pattern)? {
            if is_backup_path(&path) {
                continue;
            }
            matched += 1;
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }

        debug!(pattern, matched, "expanded pattern");
    }

    Ok(files)
}

/// Files a restore run should cover.
///
/// Same as [`expand_patterns`], followed by the originals of matching
/// `.backup` files whose original no longer exists, so deleted files can be
/// brought back too.
pub fn expand_restore_targets<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = expand_patterns(root, patterns)?;
    let mut seen: HashSet<PathBuf> = files.iter().cloned().collect();

    for pattern in patterns {
        let backup_pattern = format!("{}{}", pattern.as_ref(), BACKUP_SUFFIX);

        for backup in glob_files(root, &backup_pattern)? {
            let Some(original) = original_for_backup(&backup) else {
                continue;
            };
            if original.exists() {
                continue;
            }
            if seen.insert(original.clone()) {
                debug!(path = %original.display(), "original missing, restoring from backup");
                files.push(original);
            }
        }
    }

    Ok(files)
}

/// Regular files matched by one pattern, sorted by path
fn glob_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = anchor_pattern(root, pattern);

    let entries = glob::glob(&full_pattern)
        .with_context(|| format!("Invalid glob pattern '{}'", pattern))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(pattern, error = %e, "skipping unreadable entry"),
        }
    }
    Ok(files)
}

/// Join a relative pattern onto `root`, escaping any glob syntax in `root`
fn anchor_pattern(root: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() || root == Path::new(".") || root.as_os_str().is_empty() {
        return pattern.to_string();
    }

    let root = glob::Pattern::escape(&root.to_string_lossy());
    format!("{}/{}", root.trim_end_matches('/'), pattern)
}

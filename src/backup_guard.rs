//! Sibling backups of files before they are rewritten
//!
//! Every file gets its backup at `<path>.backup`, written and synced before the
//! rewritten content may be persisted. Repeated runs overwrite the previous
//! backup; there is no rotation.

use crate::error::FileError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Suffix appended to a file's full name to form its backup path
pub const BACKUP_SUFFIX: &str = ".backup";

/// Derive the backup path for `path` (`src/a.cpp` -> `src/a.cpp.backup`)
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Whether `path` is itself a backup written by [`capture`]
pub fn is_backup_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(BACKUP_SUFFIX))
}

/// The file a backup belongs to (`src/a.cpp.backup` -> `src/a.cpp`)
pub fn original_for_backup(backup: &Path) -> Option<PathBuf> {
    let name = backup.file_name()?.to_str()?;
    let original = name.strip_suffix(BACKUP_SUFFIX).filter(|n| !n.is_empty())?;
    Some(backup.with_file_name(original))
}

/// Persist `content` verbatim as the backup of `path`.
///
/// Returns the backup path once the bytes are on disk. On error the caller
/// must not touch `path`.
pub fn capture(path: &Path, content: &str) -> Result<PathBuf, FileError> {
    let backup = backup_path_for(path);

    write_synced(&backup, content.as_bytes()).map_err(|source| FileError::BackupWrite {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;

    debug!(
        path = %path.display(),
        backup = %backup.display(),
        bytes = content.len(),
        "captured backup"
    );
    Ok(backup)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Copy the backup of `path` back over `path`.
///
/// With `remove_backup`, the backup file is deleted after a successful
/// restore. Returns the backup path that was used.
pub fn restore(path: &Path, remove_backup: bool) -> Result<PathBuf, FileError> {
    let backup = backup_path_for(path);

    let bytes = fs::read(&backup).map_err(|source| FileError::Read {
        path: backup.clone(),
        source,
    })?;

    write_atomically(path, &bytes).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    if remove_backup {
        fs::remove_file(&backup).map_err(|source| FileError::Write {
            path: backup.clone(),
            source,
        })?;
    }

    debug!(path = %path.display(), backup = %backup.display(), "restored from backup");
    Ok(backup)
}

/// Replace the contents of `path` without ever exposing a partial write.
///
/// The bytes go to a temp file in the same directory, which is synced, given
/// the original file's permissions, and renamed over `path`. A symlink is
/// followed: its target is replaced and the link itself is kept.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = write_target(path)?;
    let parent_dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    // Same directory as the target so the rename stays on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(&target) {
        fs::set_permissions(temp_file.path(), metadata.permissions())?;
    }

    temp_file.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

fn write_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            let target = fs::canonicalize(path)?;
            debug!(path = %path.display(), target = %target.display(), "writing through symlink");
            Ok(target)
        }
        _ => Ok(path.to_path_buf()),
    }
}

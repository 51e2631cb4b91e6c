//! Per-file error taxonomy and actionable error messages

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single file's unit of work.
///
/// Every variant is caught at the file boundary by the batch driver and
/// turned into a failed report; none of them stops a run.
#[derive(Debug, Error)]
pub enum FileError {
    /// The source file could not be opened or is not valid UTF-8
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backup copy could not be written; the original was not touched
    #[error("Failed to write backup {} for {}: {source}", .backup.display(), .path.display())]
    BackupWrite {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rewritten content could not be persisted to the original path
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Path of the file whose unit of work failed
    pub fn path(&self) -> &Path {
        match self {
            FileError::Read { path, .. }
            | FileError::BackupWrite { path, .. }
            | FileError::Write { path, .. } => path,
        }
    }

    fn io_source(&self) -> &io::Error {
        match self {
            FileError::Read { source, .. }
            | FileError::BackupWrite { source, .. }
            | FileError::Write { source, .. } => source,
        }
    }

    /// Suggested fixes for the common causes, if any apply
    pub fn hint(&self) -> Option<String> {
        let source = self.io_source();
        let target = match self {
            FileError::BackupWrite { backup, .. } => backup.as_path(),
            _ => self.path(),
        };

        if is_permission_denied(source) {
            Some(permission_hint(target))
        } else if is_not_found(source) {
            Some(not_found_hint(target))
        } else if source.kind() == io::ErrorKind::InvalidData {
            Some("The file is not valid UTF-8; only UTF-8 sources can be rewritten".to_string())
        } else {
            None
        }
    }
}

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

fn permission_hint(path: &Path) -> String {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    format!(
        "Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. Ensure the directory is writable: chmod u+w '{}'",
        path.display(),
        parent_dir
    )
}

fn not_found_hint(path: &Path) -> String {
    format!(
        "Possible fixes:\n\
         1. Check the path is correct: '{}'\n\
         2. Glob patterns are resolved against the current working directory",
        path.display()
    )
}

//! Per-file read -> backup -> rewrite -> write, aggregated over a run
//!
//! Each file is one serialized unit of work. Errors stop that file only: they
//! are caught here, turned into a failed [`FileReport`], and the run moves on
//! to the next path.

use crate::backup_guard::{self, write_atomically};
use crate::error::FileError;
use crate::rewriter::{LiteralRewriter, RewriteStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of one successfully processed file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Backup written for this file; `None` in dry-run mode
    pub backup: Option<PathBuf>,
    pub original: String,
    pub rewritten: String,
    pub stats: RewriteStats,
}

impl FileOutcome {
    pub fn changed(&self) -> bool {
        self.original != self.rewritten
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Succeeded,
    Failed,
}

/// One line of the run report
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub message: String,
    pub replacements: usize,
}

/// Accumulated result of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            succeeded: 0,
            failed: 0,
            files: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Total replacements over all succeeded files
    pub fn replacements(&self) -> usize {
        self.files.iter().map(|f| f.replacements).sum()
    }

    fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Succeeded => self.succeeded += 1,
            FileStatus::Failed => self.failed += 1,
        }
        self.files.push(report);
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

/// Drives the rewriter over a list of files
pub struct BatchDriver {
    rewriter: LiteralRewriter,
    dry_run: bool,
    write: fn(&Path, &[u8]) -> io::Result<()>,
}

impl BatchDriver {
    pub fn new(rewriter: LiteralRewriter) -> Self {
        Self {
            rewriter,
            dry_run: false,
            write: write_atomically,
        }
    }

    /// Rewrite in memory only: no backups, no writes
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run the unit of work for one file.
    ///
    /// The backup is captured before anything is written; if that fails the
    /// original is left alone. Unchanged files are backed up but not
    /// rewritten.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, FileError> {
        let original = fs::read_to_string(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let (rewritten, stats) = self.rewriter.rewrite_with_stats(&original);

        if stats.lossy() > 0 {
            warn!(
                path = %path.display(),
                count = stats.lossy(),
                "aggregate-initializer rule discarded brace-block content"
            );
        }

        if self.dry_run {
            return Ok(FileOutcome {
                path: path.to_path_buf(),
                backup: None,
                original,
                rewritten,
                stats,
            });
        }

        let backup = backup_guard::capture(path, &original)?;

        if rewritten != original {
            (self.write)(path, rewritten.as_bytes()).map_err(|source| FileError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        } else {
            debug!(path = %path.display(), "no literals matched, leaving file as is");
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            backup: Some(backup),
            original,
            rewritten,
            stats,
        })
    }

    /// Process every path in order, calling `on_file` after each one.
    ///
    /// Never stops early: the returned summary has one report per path.
    pub fn run<F>(&self, paths: &[PathBuf], mut on_file: F) -> RunSummary
    where
        F: FnMut(&Path, &Result<FileOutcome, FileError>),
    {
        let mut summary = RunSummary::new(self.dry_run);

        for path in paths {
            let result = self.process_file(path);
            on_file(path, &result);
            summary.record(report_for(path, &result, self.dry_run));
        }

        let summary = summary.finish();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            dry_run = self.dry_run,
            "run complete"
        );
        summary
    }
}

fn report_for(path: &Path, result: &Result<FileOutcome, FileError>, dry_run: bool) -> FileReport {
    match result {
        Ok(outcome) => {
            let replacements = outcome.stats.total();
            let message = if dry_run {
                format!("Would make {} replacement(s)", replacements)
            } else {
                format!("Processed with {} replacement(s)", replacements)
            };
            info!(path = %path.display(), replacements, "file processed");
            FileReport {
                path: path.to_path_buf(),
                status: FileStatus::Succeeded,
                message,
                replacements,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file failed");
            FileReport {
                path: path.to_path_buf(),
                status: FileStatus::Failed,
                message: e.to_string(),
                replacements: 0,
            }
        }
    }
}

/// Restore every path from its backup, with the same per-file isolation as
/// [`BatchDriver::run`]
pub fn restore_all<F>(paths: &[PathBuf], remove_backups: bool, mut on_file: F) -> RunSummary
where
    F: FnMut(&Path, &Result<PathBuf, FileError>),
{
    let mut summary = RunSummary::new(false);

    for path in paths {
        let result = backup_guard::restore(path, remove_backups);
        on_file(path, &result);

        let report = match &result {
            Ok(backup) => FileReport {
                path: path.clone(),
                status: FileStatus::Succeeded,
                message: format!("Restored from {}", backup.display()),
                replacements: 0,
            },
            Err(e) => FileReport {
                path: path.clone(),
                status: FileStatus::Failed,
                message: e.to_string(),
                replacements: 0,
            },
        };
        summary.record(report);
    }

    summary.finish()
}

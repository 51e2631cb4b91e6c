//! Diagnostic logging for litwrap
//!
//! Logs go to stderr (warnings only, or debug with `--verbose`) and, when
//! `--log-file` is given, are also appended to that file. User-facing progress
//! and the run summary are printed to stdout and are not part of the log.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Filter directive for the requested verbosity
pub fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        "litwrap=debug"
    } else {
        "litwrap=warn"
    }
}

/// Initialize the logging system
///
/// The returned guard flushes the log file when dropped and must be kept alive
/// for the duration of the run. It is `None` when no log file was requested.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (directory, file_name) = split_log_path(path)?;
            fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = registry()
        .with(EnvFilter::new(filter_directive(verbose)))
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(guard)
}

/// Split a log file path into the directory to create and the file name
fn split_log_path(path: &Path) -> Result<(&Path, &Path)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", path.display()))?;

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    Ok((directory, Path::new(file_name)))
}

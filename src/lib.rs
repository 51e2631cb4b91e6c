//! litwrap: wrap string literals in source files with a wrapper call
//!
//! The rewriting engine lives in [`rewriter`]; [`backup_guard`] guarantees a
//! recovery copy of every file before it is changed, and [`batch`] ties the
//! two together over a list of files found by [`discovery`].

pub mod backup_guard;
pub mod batch;
pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod discovery;
pub mod error;
pub mod logger;
pub mod rewriter;

// Re-export commonly used types for convenience
pub use backup_guard::{backup_path_for, capture, restore, BACKUP_SUFFIX};
pub use batch::{BatchDriver, FileOutcome, FileReport, FileStatus, RunSummary};
pub use discovery::{expand_patterns, DEFAULT_PATTERNS};
pub use error::FileError;
pub use rewriter::{LiteralRewriter, RewriteOptions, RewriteRule, RewriteStats, RuleKind};

use crate::batch::{FileOutcome, RunSummary};
use crate::error::FileError;
use crate::rewriter::RuleKind;
use colored::*;
use similar::{ChangeTag, TextDiff};
use std::io::IsTerminal;
use std::path::Path;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    pub fn should_use_color() -> bool {
        std::io::stdout().is_terminal()
    }

    /// Line diff of one rewritten file, with `context_size` lines around each change
    pub fn format_preview(outcome: &FileOutcome, context_size: usize, use_color: bool) -> String {
        let mut output = String::new();
        let path = outcome.path.display().to_string();

        if use_color {
            output.push_str(&format!("{}\n", path.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", path));
        }

        let diff = TextDiff::from_lines(outcome.original.as_str(), outcome.rewritten.as_str());

        for (group_idx, group) in diff.grouped_ops(context_size).iter().enumerate() {
            // "..." between distant groups
            if group_idx > 0 {
                if use_color {
                    output.push_str(&format!("{}\n", "...".dimmed()));
                } else {
                    output.push_str("...\n");
                }
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let (line_num, indicator) = match change.tag() {
                        ChangeTag::Equal => (change.new_index(), "="),
                        ChangeTag::Delete => (change.old_index(), "-"),
                        ChangeTag::Insert => (change.new_index(), "+"),
                    };
                    let line_num = line_num.map_or(0, |i| i + 1);
                    let content = change.value().trim_end_matches(['\r', '\n']);

                    if use_color {
                        let colored_line = match change.tag() {
                            ChangeTag::Equal => format!("L{}: {} {}\n", line_num, indicator.dimmed(), content.dimmed()),
                            ChangeTag::Delete => format!("L{}: {} {}\n", line_num, indicator.red().bold(), content.red()),
                            ChangeTag::Insert => format!("L{}: {} {}\n", line_num, indicator.green().bold(), content.green().bold()),
                        };
                        output.push_str(&colored_line);
                    } else {
                        output.push_str(&format!("L{}: {} {}\n", line_num, indicator, content));
                    }
                }
            }
        }

        // Summary
        let total = outcome.stats.total();
        let parts: Vec<String> = RuleKind::ALL
            .iter()
            .filter(|rule| outcome.stats.get(**rule) > 0)
            .map(|rule| format!("{} {}", outcome.stats.get(*rule), rule))
            .collect();

        if use_color {
            output.push_str(&format!("\nTotal: {} replacement", total.to_string().bold().white()));
        } else {
            output.push_str(&format!("\nTotal: {} replacement", total));
        }
        if total != 1 {
            output.push('s');
        }
        if !parts.is_empty() {
            output.push_str(&format!(" ({})", parts.join(", ")));
        }
        output.push('\n');

        let lossy = outcome.stats.lossy();
        if lossy > 0 {
            let warning = format!(
                "Warning: {} brace block(s) collapsed by the aggregate-initializer rule (use --no-aggregate to disable)",
                lossy
            );
            if use_color {
                output.push_str(&format!("{}\n", warning.yellow().bold()));
            } else {
                output.push_str(&format!("{}\n", warning));
            }
        }

        output
    }

    /// Status line for one processed file
    pub fn format_file_status(
        path: &Path,
        result: &Result<FileOutcome, FileError>,
        use_color: bool,
    ) -> String {
        match result {
            Ok(outcome) => {
                let line = format!(
                    "Processed: {} ({} replacement{})",
                    path.display(),
                    outcome.stats.total(),
                    if outcome.stats.total() == 1 { "" } else { "s" }
                );
                if use_color {
                    line.green().to_string()
                } else {
                    line
                }
            }
            Err(e) => Self::format_error(path, e, use_color),
        }
    }

    /// Status line for one restored file
    pub fn format_restore_status(
        path: &Path,
        result: &Result<std::path::PathBuf, FileError>,
        use_color: bool,
    ) -> String {
        match result {
            Ok(backup) => {
                let line = format!("Restored: {} (from {})", path.display(), backup.display());
                if use_color {
                    line.green().to_string()
                } else {
                    line
                }
            }
            Err(e) => Self::format_error(path, e, use_color),
        }
    }

    fn format_error(path: &Path, error: &FileError, use_color: bool) -> String {
        let mut line = format!("Error processing {}: {}", path.display(), error);
        if use_color {
            line = line.red().to_string();
        }
        if let Some(hint) = error.hint() {
            line.push_str("\n\n");
            line.push_str(&hint);
            line.push('\n');
        }
        line
    }

    /// Final counts of a run
    pub fn format_summary(summary: &RunSummary, use_color: bool) -> String {
        let mut output = String::new();
        let heading = if summary.dry_run {
            "Dry run complete (no files were modified):"
        } else {
            "Processing complete:"
        };

        output.push('\n');
        if use_color {
            output.push_str(&format!("{}\n", heading.bold()));
            output.push_str(&format!("Succeeded: {} file(s)\n", summary.succeeded.to_string().green().bold()));
            let failed = summary.failed.to_string();
            let failed = if summary.failed > 0 { failed.red().bold() } else { failed.normal() };
            output.push_str(&format!("Failed: {} file(s)\n", failed));
        } else {
            output.push_str(&format!("{}\n", heading));
            output.push_str(&format!("Succeeded: {} file(s)\n", summary.succeeded));
            output.push_str(&format!("Failed: {} file(s)\n", summary.failed));
        }

        output
    }
}

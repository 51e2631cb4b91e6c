use anyhow::{Context, Result};
use litwrap::batch::{self, BatchDriver, RunSummary};
use litwrap::cli::{self, Args, RewriteArgs};
use litwrap::config;
use litwrap::diff_formatter::DiffFormatter;
use litwrap::discovery::{expand_patterns, expand_restore_targets};
use litwrap::logger;
use litwrap::rewriter::{LiteralRewriter, RewriteOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let (args, log_args) = cli::parse_args()?;

    // Held until exit so buffered log lines reach the file
    let _log_guard = logger::init_logging(log_args.verbose, log_args.log_file.as_deref())?;

    let summary = match args {
        Args::Rewrite(rewrite) => run_rewrite(&rewrite)?,
        Args::Restore {
            patterns,
            clean,
            config,
            json,
        } => run_restore(&patterns, clean, config.as_deref(), json)?,
        Args::InitConfig { path } => {
            config::save_default_config(&path)?;
            println!("Wrote default run profile to {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
    };

    if summary.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_rewrite(args: &RewriteArgs) -> Result<RunSummary> {
    let config = args.resolve()?;
    let rewriter = LiteralRewriter::new(RewriteOptions::from(&config.rewrite))?;
    let files = discover(&config.files.patterns)?;

    let use_color = !args.json && DiffFormatter::should_use_color();
    let context = config.output.context_lines;
    let driver = BatchDriver::new(rewriter).dry_run(args.dry_run);

    let summary = driver.run(&files, |path, result| {
        if args.json {
            return;
        }
        match result {
            Ok(outcome) if args.dry_run => {
                if outcome.changed() {
                    print!("{}", DiffFormatter::format_preview(outcome, context, use_color));
                    println!();
                }
            }
            Ok(_) => println!("{}", DiffFormatter::format_file_status(path, result, use_color)),
            Err(_) => eprintln!("{}", DiffFormatter::format_file_status(path, result, use_color)),
        }
    });

    report(&summary, args.json, use_color)?;
    Ok(summary)
}

fn run_restore(
    patterns: &[String],
    clean: bool,
    config: Option<&Path>,
    json: bool,
) -> Result<RunSummary> {
    let patterns = cli::resolve_restore_patterns(patterns, config)?;
    let files = expand_restore_targets(Path::new("."), &patterns)?;
    if files.is_empty() {
        eprintln!("No files matched: {}", patterns.join(", "));
    }
    let use_color = !json && DiffFormatter::should_use_color();

    let summary = batch::restore_all(&files, clean, |path, result| {
        if json {
            return;
        }
        let line = DiffFormatter::format_restore_status(path, result, use_color);
        if result.is_ok() {
            println!("{}", line);
        } else {
            eprintln!("{}", line);
        }
    });

    report(&summary, json, use_color)?;
    Ok(summary)
}

fn discover(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let files = expand_patterns(Path::new("."), patterns)?;
    if files.is_empty() {
        eprintln!("No files matched: {}", patterns.join(", "));
    }
    Ok(files)
}

fn report(summary: &RunSummary, json: bool, use_color: bool) -> Result<()> {
    if json {
        let output =
            serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
        println!("{}", output);
    } else {
        print!("{}", DiffFormatter::format_summary(summary, use_color));
    }
    Ok(())
}

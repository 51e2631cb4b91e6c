use crate::config::{load_config, validate_config, Config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "litwrap")]
#[command(about = "Wrap string literals in source files with a wrapper call, keeping backups")]
#[command(long_about = "litwrap rewrites raw string literals into wrapper calls, e.g. to migrate a
C++/Qt codebase from \"text\" to QS(\"text\").

Every file is copied to <file>.backup before it is rewritten, and the new
content replaces the original atomically. A file that fails (unreadable,
backup not writable, write error) is reported and skipped; the run continues.

RULES (applied in this order, each over the output of the previous one):
  1. call argument     foo(\"x\")          -> foo(QS(\"x\"))
  2. assignment        name = \"x\"        -> name = QS(\"x\")
  3. construction      new T(\"x\"         -> new T(QS(\"x\")
  4. aggregate init    { \"a\", \"b\" }     -> {b}   (LOSSY, see --no-aggregate)

Matching is purely textual: literals in comments are rewritten too, and
already-wrapped literals are wrapped again unless --skip-wrapped is given.

EXAMPLES:
  litwrap                                  Rewrite src/*.cpp, src/*.h, tools/**/*.cpp, tools/**/*.h
  litwrap --dry-run 'src/**/*.cpp'         Preview changes without writing anything
  litwrap -w QStringLiteral 'lib/*.h'      Use a different wrapper
  litwrap --skip-wrapped --no-aggregate    Safe re-run over already-rewritten files
  litwrap restore 'src/*.cpp'              Put the backed-up originals back")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Glob patterns selecting the files to rewrite (relative to the working directory)
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Wrapper call to place around literals
    #[arg(short = 'w', long, value_name = "NAME")]
    #[arg(help = "Wrapper call to place around literals (default: QS)")]
    wrapper: Option<String>,

    /// Dry run mode (preview changes without applying)
    #[arg(short = 'd', long)]
    #[arg(help = "Preview changes without modifying files\nNo backups are written in this mode")]
    dry_run: bool,

    /// Number of context lines to show (default: 2)
    #[arg(short = 'n', long, value_name = "NUM")]
    #[arg(help = "Number of context lines to show around changes in --dry-run output")]
    context: Option<usize>,

    /// Do not wrap literals that are already arguments of the wrapper
    #[arg(long)]
    #[arg(help = "Leave existing wrapper calls alone so re-runs do not double-wrap")]
    skip_wrapped: bool,

    /// Disable the lossy aggregate-initializer rule
    #[arg(long)]
    #[arg(help = "Disable rule 4, which collapses { ... \"x\" ... } blocks to {x}")]
    no_aggregate: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Run profile
    #[arg(short = 'c', long, value_name = "FILE")]
    #[arg(help = "Load settings from a TOML run profile (see 'litwrap init-config')")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Restore files from their .backup copies
    #[command(long_about = "Copy <file>.backup back over <file> for every matched file.

Patterns default to the same set as a rewrite run. A file that was deleted
after its rewrite is restored too, as long as its <file>.backup matches one of
the patterns with the suffix appended. Existing files without a backup are
reported as failed.

EXAMPLES:
  litwrap restore                  Restore all default-pattern files
  litwrap restore 'src/*.cpp'      Restore specific files
  litwrap restore --clean          Restore and delete the backups")]
    Restore {
        /// Glob patterns selecting the files to restore
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Delete each backup after it has been restored
        #[arg(long)]
        clean: bool,

        /// Run profile (only its patterns are used)
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a commented default run profile
    #[command(name = "init-config")]
    InitConfig {
        /// Where to write the profile
        #[arg(value_name = "FILE", default_value = "litwrap.toml")]
        path: PathBuf,
    },
}

/// Options shared by every command
#[derive(Debug, Clone, PartialEq)]
pub struct LogArgs {
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

/// Overrides given on the command line for a rewrite run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewriteArgs {
    pub patterns: Vec<String>,
    pub wrapper: Option<String>,
    pub dry_run: bool,
    pub context: Option<usize>,
    pub skip_wrapped: bool,
    pub no_aggregate: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

impl RewriteArgs {
    /// Merge the run profile (or defaults) with the command-line overrides
    pub fn resolve(&self) -> Result<Config> {
        let mut config = load_profile(self.config.as_deref())?;

        if !self.patterns.is_empty() {
            config.files.patterns = self.patterns.clone();
        }
        if let Some(wrapper) = &self.wrapper {
            config.rewrite.wrapper = wrapper.clone();
        }
        if self.skip_wrapped {
            config.rewrite.skip_wrapped = true;
        }
        if self.no_aggregate {
            config.rewrite.aggregate_rule = false;
        }
        if let Some(context) = self.context {
            config.output.context_lines = context;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Patterns for a restore run: explicit ones win over the profile's
pub fn resolve_restore_patterns(patterns: &[String], config: Option<&Path>) -> Result<Vec<String>> {
    if !patterns.is_empty() {
        return Ok(patterns.to_vec());
    }
    Ok(load_profile(config)?.files.patterns)
}

fn load_profile(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Rewrite(RewriteArgs),
    Restore {
        patterns: Vec<String>,
        clean: bool,
        config: Option<PathBuf>,
        json: bool,
    },
    InitConfig {
        path: PathBuf,
    },
}

pub fn parse_args() -> Result<(Args, LogArgs)> {
    Ok(from_cli(Cli::parse()))
}

/// Parse from an explicit argument list (used by tests)
pub fn parse_from<I, T>(iter: I) -> Result<(Args, LogArgs)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(from_cli(Cli::try_parse_from(iter)?))
}

fn from_cli(cli: Cli) -> (Args, LogArgs) {
    let log = LogArgs {
        verbose: cli.verbose,
        log_file: cli.log_file,
    };

    let args = match cli.command {
        Some(Commands::Restore {
            patterns,
            clean,
            config,
            json,
        }) => Args::Restore {
            patterns,
            clean,
            config,
            json,
        },
        Some(Commands::InitConfig { path }) => Args::InitConfig { path },
        None => Args::Rewrite(RewriteArgs {
            patterns: cli.patterns,
            wrapper: cli.wrapper,
            dry_run: cli.dry_run,
            context: cli.context,
            skip_wrapped: cli.skip_wrapped,
            no_aggregate: cli.no_aggregate,
            json: cli.json,
            config: cli.config,
        }),
    };

    (args, log)
}

//! Run profiles for litwrap
//!
//! A profile is an optional TOML file passed with `--config`. Nothing is read
//! from the home directory or the environment; without `--config` the built-in
//! defaults apply. Command-line flags override profile values.

use crate::discovery::DEFAULT_PATTERNS;
use crate::rewriter::{is_valid_wrapper, RewriteOptions, DEFAULT_WRAPPER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Commented template written by `litwrap init-config`
pub const DEFAULT_CONFIG: &str = r#"# litwrap run profile
#
# Pass this file with: litwrap --config litwrap.toml
# Command-line flags override the values set here.

[rewrite]
# Wrapper call placed around each literal (default: "QS")
wrapper = "QS"

# Leave existing wrapper calls alone so re-runs do not double-wrap (default: false)
skip_wrapped = false

# Apply the aggregate-initializer rule (default: true)
# WARNING: this rule is lossy. `{ "a", "b" }` becomes `{b}` and any other
# content of the brace block is discarded.
aggregate_rule = true

[files]
# Glob patterns relative to the working directory; `**` recurses
patterns = ["src/*.cpp", "src/*.h", "tools/**/*.cpp", "tools/**/*.h"]

[output]
# Context lines around changes in --dry-run diffs (default: 2, max: 10)
context_lines = 2
"#;

/// litwrap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rewrite rule settings
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// File selection settings
    #[serde(default)]
    pub files: FilesConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Wrapper call name
    #[serde(default = "default_wrapper")]
    pub wrapper: String,

    /// Skip literals already inside a wrapper call
    #[serde(default)]
    pub skip_wrapped: bool,

    /// Apply the lossy aggregate-initializer rule
    #[serde(default = "default_aggregate_rule")]
    pub aggregate_rule: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            wrapper: default_wrapper(),
            skip_wrapped: false,
            aggregate_rule: default_aggregate_rule(),
        }
    }
}

impl From<&RewriteConfig> for RewriteOptions {
    fn from(config: &RewriteConfig) -> Self {
        RewriteOptions {
            wrapper: config.wrapper.clone(),
            skip_wrapped: config.skip_wrapped,
            aggregate_rule: config.aggregate_rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Glob patterns to expand
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of context lines to show in previews
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

// Default functions for serde
fn default_wrapper() -> String { DEFAULT_WRAPPER.to_string() }
fn default_aggregate_rule() -> bool { true }
fn default_patterns() -> Vec<String> { DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect() }
fn default_context_lines() -> usize { 2 }

/// Load and validate a profile
pub fn load_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&config_str)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}

/// Parse and validate profile text
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str).context("Failed to parse TOML")?;
    validate_config(&config)?;
    Ok(config)
}

/// Write the commented default profile, refusing to clobber an existing file
pub fn save_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if !is_valid_wrapper(&config.rewrite.wrapper) {
        anyhow::bail!(
            "Invalid wrapper: '{}' (must be an identifier, optionally ::-qualified)",
            config.rewrite.wrapper
        );
    }

    if config.files.patterns.is_empty() {
        anyhow::bail!("Invalid patterns: at least one glob pattern is required");
    }

    if let Some(blank) = config.files.patterns.iter().find(|p| p.trim().is_empty()) {
        anyhow::bail!("Invalid pattern: '{}' (must not be blank)", blank);
    }

    if config.output.context_lines > 10 {
        anyhow::bail!("Invalid context_lines: {} (max 10)", config.output.context_lines);
    }

    Ok(())
}

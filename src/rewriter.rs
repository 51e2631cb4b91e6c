//! Literal rewriting engine
//!
//! Wraps quoted string literals in a wrapper call by applying an ordered list
//! of regex rules to the whole file content. There is no lexical model of the
//! host language: rules are plain text patterns, so literals inside comments
//! are rewritten too, and already-wrapped text can be wrapped again unless
//! [`RewriteOptions::skip_wrapped`] is set.
//!
//! Rule order is fixed. Each rule runs over the output of the previous one,
//! narrow call-site rules first and the broad aggregate-initializer rule last.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;

/// Default wrapper call name
pub const DEFAULT_WRAPPER: &str = "QS";

/// A double-quoted literal whose body may contain backslash escapes
const LITERAL: &str = r#""(?:[^"\\]|\\.)*""#;

/// The rewrite rules, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `ident("x")` / `ident("x", ...)` -> `ident(WRAP("x"))` / `ident(WRAP("x"), ...)`
    CallArgument,
    /// `name = "x"` -> `name = WRAP("x")`
    Assignment,
    /// `new Type("x"` -> `new Type(WRAP("x")`
    Construction,
    /// `{ ... "x" ... }` -> `{x}` (lossy)
    AggregateInitializer,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::CallArgument,
        RuleKind::Assignment,
        RuleKind::Construction,
        RuleKind::AggregateInitializer,
    ];

    fn pattern(self) -> String {
        match self {
            RuleKind::CallArgument => format!(r"(\w+)\(({LITERAL})(\s*[,)])"),
            RuleKind::Assignment => format!(r"(\w+)\s*=\s*({LITERAL})"),
            RuleKind::Construction => format!(r"\bnew\s+(\w+)\(({LITERAL})"),
            RuleKind::AggregateInitializer => format!(r"\{{[^}}]*({LITERAL})[^}}]*\}}"),
        }
    }

    /// Whether the rule discards source text instead of wrapping it
    pub fn is_lossy(self) -> bool {
        matches!(self, RuleKind::AggregateInitializer)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::CallArgument => "call-argument",
            RuleKind::Assignment => "assignment",
            RuleKind::Construction => "construction",
            RuleKind::AggregateInitializer => "aggregate-initializer",
        };
        f.write_str(name)
    }
}

/// Knobs for a [`LiteralRewriter`]
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOptions {
    /// Name of the wrapper call, e.g. `QS` or `tr::lit`
    pub wrapper: String,
    /// Leave calls to the wrapper itself alone, so re-runs do not double-wrap
    pub skip_wrapped: bool,
    /// Apply the lossy aggregate-initializer rule
    pub aggregate_rule: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            wrapper: DEFAULT_WRAPPER.to_string(),
            skip_wrapped: false,
            aggregate_rule: true,
        }
    }
}

/// Per-rule replacement counts for one rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub call_argument: usize,
    pub assignment: usize,
    pub construction: usize,
    pub aggregate_initializer: usize,
}

impl RewriteStats {
    fn record(&mut self, rule: RuleKind, count: usize) {
        match rule {
            RuleKind::CallArgument => self.call_argument += count,
            RuleKind::Assignment => self.assignment += count,
            RuleKind::Construction => self.construction += count,
            RuleKind::AggregateInitializer => self.aggregate_initializer += count,
        }
    }

    pub fn get(&self, rule: RuleKind) -> usize {
        match rule {
            RuleKind::CallArgument => self.call_argument,
            RuleKind::Assignment => self.assignment,
            RuleKind::Construction => self.construction,
            RuleKind::AggregateInitializer => self.aggregate_initializer,
        }
    }

    /// Total replacements across all rules
    pub fn total(&self) -> usize {
        RuleKind::ALL.iter().map(|rule| self.get(*rule)).sum()
    }

    /// Replacements that discarded source text
    pub fn lossy(&self) -> usize {
        RuleKind::ALL
            .iter()
            .filter(|rule| rule.is_lossy())
            .map(|rule| self.get(*rule))
            .sum()
    }
}

/// One compiled pattern/replacement pair
#[derive(Debug, Clone)]
pub struct RewriteRule {
    kind: RuleKind,
    regex: Regex,
}

impl RewriteRule {
    pub fn new(kind: RuleKind) -> Result<Self> {
        let pattern = kind.pattern();
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Invalid {} pattern: {}", kind, pattern))?;
        Ok(Self { kind, regex })
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Apply this rule to every non-overlapping match in `content`.
    ///
    /// Returns the new content and the number of matches actually rewritten.
    fn apply(&self, content: &str, options: &RewriteOptions) -> (String, usize) {
        let mut count = 0;
        let rewritten = self.regex.replace_all(content, |caps: &Captures| {
            match self.render(caps, options) {
                Some(replacement) => {
                    count += 1;
                    replacement
                }
                None => caps[0].to_string(),
            }
        });
        (rewritten.into_owned(), count)
    }

    /// Replacement text for one match, or `None` to keep the match as is
    fn render(&self, caps: &Captures, options: &RewriteOptions) -> Option<String> {
        let wrapper = options.wrapper.as_str();
        match self.kind {
            RuleKind::CallArgument => {
                let callee = &caps[1];
                if options.skip_wrapped && is_wrapper_call(callee, wrapper) {
                    return None;
                }
                Some(format!("{callee}({wrapper}({}){}", &caps[2], &caps[3]))
            }
            RuleKind::Assignment => Some(format!("{} = {wrapper}({})", &caps[1], &caps[2])),
            RuleKind::Construction => Some(format!("new {}({wrapper}({})", &caps[1], &caps[2])),
            RuleKind::AggregateInitializer => {
                if options.skip_wrapped && caps[0].contains(&format!("{wrapper}(")) {
                    return None;
                }
                let literal = &caps[1];
                Some(format!("{{{}}}", &literal[1..literal.len() - 1]))
            }
        }
    }
}

/// Whether `callee` names the wrapper; a qualified wrapper matches on its last segment
fn is_wrapper_call(callee: &str, wrapper: &str) -> bool {
    wrapper.rsplit("::").next() == Some(callee)
}

/// Applies the rewrite rules in order to whole-file content
#[derive(Debug, Clone)]
pub struct LiteralRewriter {
    rules: Vec<RewriteRule>,
    options: RewriteOptions,
}

impl LiteralRewriter {
    pub fn new(options: RewriteOptions) -> Result<Self> {
        if !is_valid_wrapper(&options.wrapper) {
            anyhow::bail!(
                "Invalid wrapper name: '{}' (expected an identifier such as QS or tr::lit)",
                options.wrapper
            );
        }

        let rules = RuleKind::ALL
            .iter()
            .filter(|kind| options.aggregate_rule || !kind.is_lossy())
            .map(|kind| RewriteRule::new(*kind))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, options })
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Active rules in application order
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Rewrite `content`, returning the transformed text
    pub fn rewrite(&self, content: &str) -> String {
        self.rewrite_with_stats(content).0
    }

    /// Rewrite `content`, also reporting how many matches each rule rewrote
    pub fn rewrite_with_stats(&self, content: &str) -> (String, RewriteStats) {
        let mut stats = RewriteStats::default();
        let mut current = content.to_string();

        for rule in &self.rules {
            let (next, count) = rule.apply(&current, &self.options);
            stats.record(rule.kind(), count);
            current = next;
        }

        (current, stats)
    }
}

/// Whether `name` can be used as a wrapper call name
pub fn is_valid_wrapper(name: &str) -> bool {
    !name.is_empty()
        && name.split("::").all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

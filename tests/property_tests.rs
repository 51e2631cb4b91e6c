//! Property-based tests for litwrap
//!
//! This module uses proptest to verify core invariants of the rewriter and
//! the batch driver over generated inputs.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use litwrap::{BatchDriver, LiteralRewriter, RewriteOptions, backup_path_for};

// Import proptest macro
use proptest::prelude::*;

fn rewriter(wrapper: &str, skip_wrapped: bool, aggregate_rule: bool) -> LiteralRewriter {
    LiteralRewriter::new(RewriteOptions {
        wrapper: wrapper.to_string(),
        skip_wrapped,
        aggregate_rule,
    })
    .unwrap()
}

// ============================================================================
// Property 1: Content without literals is never changed
// ============================================================================

proptest! {
    #[test]
    fn prop_no_quotes_is_noop(text in "[a-zA-Z0-9_ (){};=,.*+\\[\\]\n\t-]{0,200}") {
        let rewriter = rewriter("QS", false, true);
        prop_assert_eq!(rewriter.rewrite(&text), text);
    }
}

// ============================================================================
// Property 2: Call-argument and assignment literals are wrapped
// ============================================================================

proptest! {
    #[test]
    fn prop_sole_call_argument_is_wrapped(
        callee in "[a-z_][a-z0-9_]{0,10}",
        body in "[a-zA-Z0-9 %:.!?]{0,30}"
    ) {
        let rewriter = rewriter("WRAP", false, true);
        let input = format!("{}(\"{}\");", callee, body);
        let expected = format!("{}(WRAP(\"{}\"));", callee, body);
        prop_assert_eq!(rewriter.rewrite(&input), expected);
    }

    #[test]
    fn prop_assignment_is_wrapped(
        name in "[a-z_][a-z0-9_]{0,10}",
        body in "[a-zA-Z0-9 %:.!?]{0,30}"
    ) {
        let rewriter = rewriter("WRAP", false, true);
        let input = format!("{} = \"{}\";", name, body);
        let expected = format!("{} = WRAP(\"{}\");", name, body);
        prop_assert_eq!(rewriter.rewrite(&input), expected);
    }

    /// Every literal of a brace-free, line-per-statement file ends up wrapped
    /// and none of the literal text is lost
    #[test]
    fn prop_statement_literals_are_all_wrapped(
        bodies in prop::collection::vec("[a-z ]{0,12}", 1..20)
    ) {
        let rewriter = rewriter("WRAP", false, true);
        let input: String = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                if i % 2 == 0 {
                    format!("call{}(\"{}\");\n", i, body)
                } else {
                    format!("var{} = \"{}\";\n", i, body)
                }
            })
            .collect();

        let (output, stats) = rewriter.rewrite_with_stats(&input);

        prop_assert_eq!(stats.total(), bodies.len());
        prop_assert_eq!(output.matches("WRAP(\"").count(), bodies.len());
        for body in &bodies {
            let wrapped = format!("WRAP(\"{}\")", body);
            prop_assert!(output.contains(&wrapped));
        }
    }
}

// ============================================================================
// Property 3: With skip_wrapped, a second pass changes nothing
// ============================================================================

proptest! {
    #[test]
    fn prop_skip_wrapped_rerun_is_stable(
        bodies in prop::collection::vec("[a-z ]{0,12}", 1..20)
    ) {
        let rewriter = rewriter("QS", true, false);
        let input: String = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| match i % 3 {
                0 => format!("log(\"{}\");\n", body),
                1 => format!("label = \"{}\";\n", body),
                _ => format!("w = new Widget(\"{}\" + suffix);\n", body),
            })
            .collect();

        let once = rewriter.rewrite(&input);
        let twice = rewriter.rewrite(&once);
        prop_assert_eq!(once, twice);
    }
}

// ============================================================================
// Property 4: Batch accounting and backup integrity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// succeeded + failed always equals the number of paths, and every
    /// existing file has a byte-identical backup of its original content
    #[test]
    fn prop_batch_counts_cover_every_file(
        contents in prop::collection::vec("[a-z(\" =;]{0,40}", 1..8),
        missing_mask in prop::collection::vec(any::<bool>(), 8)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut expected_failed = 0;

        for (i, content) in contents.iter().enumerate() {
            let path = temp_dir.path().join(format!("file{}.cpp", i));
            if missing_mask[i] {
                expected_failed += 1;
            } else {
                fs::write(&path, content).unwrap();
            }
            paths.push(path);
        }

        let driver = BatchDriver::new(rewriter("QS", false, true));
        let summary = driver.run(&paths, |_, _| {});

        prop_assert_eq!(summary.total(), paths.len());
        prop_assert_eq!(summary.failed, expected_failed);
        prop_assert_eq!(summary.files.len(), paths.len());

        for (i, content) in contents.iter().enumerate() {
            let backup = backup_path_for(&paths[i]);
            if missing_mask[i] {
                prop_assert!(!backup.exists());
            } else {
                prop_assert_eq!(fs::read_to_string(&backup).unwrap(), content.clone());
            }
        }
    }
}

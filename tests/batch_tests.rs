//! End-to-end runs over a small source tree: discovery, backup, rewrite,
//! and restore working together.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use litwrap::batch::restore_all;
use litwrap::discovery::expand_restore_targets;
use litwrap::{
    BatchDriver, DEFAULT_PATTERNS, FileError, FileStatus, LiteralRewriter, RewriteOptions,
    backup_path_for, expand_patterns,
};

fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn qs_driver() -> BatchDriver {
    BatchDriver::new(LiteralRewriter::new(RewriteOptions::default()).unwrap())
}

#[test]
fn test_log_scenario_rewrites_and_keeps_backup() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(temp_dir.path(), "src/main.cpp", "log(\"hello world\");");

    let summary = qs_driver().run(std::slice::from_ref(&file), |_, _| {});

    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "log(QS(\"hello world\"));"
    );
    assert_eq!(
        fs::read_to_string(backup_path_for(&file)).unwrap(),
        "log(\"hello world\");"
    );
}

#[test]
fn test_status_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(temp_dir.path(), "src/status.h", "status = \"ok\";");

    qs_driver().run(std::slice::from_ref(&file), |_, _| {});

    assert_eq!(fs::read_to_string(&file).unwrap(), "status = QS(\"ok\");");
}

#[test]
fn test_full_tree_with_failures_in_the_middle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let a = write(root, "src/a.cpp", "setText(\"A\");\n");
    let b = write(root, "src/b.cpp", "title = \"B\";\n");
    let c = write(root, "tools/gen/c.h", "emit(\"C\", 1);\n");
    // Occupy b's backup path so its backup cannot be written
    fs::create_dir(backup_path_for(&b)).unwrap();

    let files = expand_patterns(root, &DEFAULT_PATTERNS).unwrap();
    assert_eq!(files, vec![a.clone(), b.clone(), c.clone()]);

    let mut failures = Vec::new();
    let summary = qs_driver().run(&files, |path, result| {
        if let Err(e) = result {
            failures.push((path.to_path_buf(), matches!(e, FileError::BackupWrite { .. })));
        }
    });

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded + summary.failed, files.len());
    assert_eq!(failures, vec![(b.clone(), true)]);
    assert_eq!(summary.files[1].status, FileStatus::Failed);

    assert_eq!(fs::read_to_string(&a).unwrap(), "setText(QS(\"A\"));\n");
    assert_eq!(fs::read_to_string(&b).unwrap(), "title = \"B\";\n");
    assert_eq!(fs::read_to_string(&c).unwrap(), "emit(QS(\"C\"), 1);\n");
}

#[test]
fn test_second_run_does_not_pick_up_backups() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let file = write(root, "src/a.cpp", "f(\"x\");\n");

    let first = expand_patterns(root, &["src/*"]).unwrap();
    qs_driver().run(&first, |_, _| {});

    let second = expand_patterns(root, &["src/*"]).unwrap();
    assert_eq!(second, vec![file]);
}

#[test]
fn test_rerun_overwrites_backup_with_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(temp_dir.path(), "src/a.cpp", "f(\"x\");");
    let paths = vec![file.clone()];

    qs_driver().run(&paths, |_, _| {});
    qs_driver().run(&paths, |_, _| {});

    // Without skip_wrapped the second pass wraps again
    assert_eq!(fs::read_to_string(&file).unwrap(), "f(QS(QS(\"x\")));");
    assert_eq!(
        fs::read_to_string(backup_path_for(&file)).unwrap(),
        "f(QS(\"x\"));"
    );
}

#[test]
fn test_skip_wrapped_rerun_is_safe() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(temp_dir.path(), "src/a.cpp", "f(\"x\");\nname = \"n\";\n");
    let paths = vec![file.clone()];
    let driver = BatchDriver::new(
        LiteralRewriter::new(RewriteOptions {
            skip_wrapped: true,
            aggregate_rule: false,
            ..RewriteOptions::default()
        })
        .unwrap(),
    );

    driver.run(&paths, |_, _| {});
    let after_first = fs::read_to_string(&file).unwrap();
    let second = driver.run(&paths, |_, _| {});

    assert_eq!(second.replacements(), 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), after_first);
    assert_eq!(after_first, "f(QS(\"x\"));\nname = QS(\"n\");\n");
}

#[test]
fn test_dry_run_over_tree_leaves_everything() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let file = write(root, "src/a.cpp", "f(\"x\");\n");

    let files = expand_patterns(root, &DEFAULT_PATTERNS).unwrap();
    let summary = qs_driver().dry_run(true).run(&files, |_, _| {});

    assert!(summary.dry_run);
    assert_eq!(summary.replacements(), 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), "f(\"x\");\n");
    assert!(!backup_path_for(&file).exists());
}

#[test]
fn test_restore_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let original = "label = \"Name\";\nshow(\"dialog\");\n";
    let file = write(root, "src/dialog.cpp", original);

    let files = expand_patterns(root, &DEFAULT_PATTERNS).unwrap();
    qs_driver().run(&files, |_, _| {});
    assert_ne!(fs::read_to_string(&file).unwrap(), original);

    let summary = restore_all(&files, false, |_, _| {});

    assert_eq!(summary.succeeded, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
    assert!(backup_path_for(&file).exists());
}

#[test]
fn test_restore_brings_back_deleted_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let file = write(root, "src/gone.cpp", "f(\"x\");\n");

    let files = expand_patterns(root, &DEFAULT_PATTERNS).unwrap();
    qs_driver().run(&files, |_, _| {});
    fs::remove_file(&file).unwrap();

    let targets = expand_restore_targets(root, &DEFAULT_PATTERNS).unwrap();
    assert_eq!(targets, vec![file.clone()]);
    let summary = restore_all(&targets, true, |_, _| {});

    assert_eq!(summary.succeeded, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), "f(\"x\");\n");
    assert!(!backup_path_for(&file).exists());
}

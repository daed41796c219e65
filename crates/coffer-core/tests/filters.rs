//! Include and exclude patterns on every operation.

#![allow(clippy::unwrap_used)]

use coffer_core::ArchiveError;
use coffer_core::ExtractionConfig;
use coffer_core::SkipReason;
use coffer_core::create_archive;
use coffer_core::creation::CreationConfig;
use coffer_core::extract_archive;
use coffer_core::list_archive;
use coffer_core::test_utils::TarTestBuilder;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sample_tar(path: &Path) {
    TarTestBuilder::new()
        .add_directory("docs/")
        .add_file("docs/a.txt", b"a")
        .add_file("docs/a.log", b"log")
        .add_file("docs/b.txt", b"b")
        .add_directory("docs/cache/")
        .add_file("docs/cache/c.txt", b"c")
        .write_to(path);
}

fn names(archive: &Path, config: &ExtractionConfig) -> Vec<String> {
    list_archive(archive, config)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.name)
        .collect()
}

#[test]
fn test_exclude_on_extract() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("s.tar");
    sample_tar(&archive);

    let out = temp.path().join("out");
    let config = ExtractionConfig::default().with_exclude_patterns(vec!["*.log".into()]);
    let report = extract_archive(&archive, &out, &config).unwrap();

    assert!(out.join("docs/a.txt").exists());
    assert!(out.join("docs/b.txt").exists());
    assert!(!out.join("docs/a.log").exists());
    assert_eq!(report.skipped_count(SkipReason::Filtered), 1);
    assert_eq!(report.skipped[0].name, "docs/a.log");
    assert!(report.skipped[0].message.is_empty());
}

#[test]
fn test_exclude_matches_directory_entry_only() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("s.tar");
    sample_tar(&archive);

    let config = ExtractionConfig::default().with_exclude_patterns(vec!["cache".into()]);
    assert_eq!(
        names(&archive, &config),
        vec![
            "docs/",
            "docs/a.txt",
            "docs/a.log",
            "docs/b.txt",
            "docs/cache/c.txt"
        ]
    );
}

#[test]
fn test_exclude_does_not_match_parent_directory_name() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("logs.tar");
    TarTestBuilder::new()
        .add_directory("build.log/")
        .add_file("build.log/keep.txt", b"keep")
        .add_file("build.log/drop.log", b"drop")
        .write_to(&archive);

    let out = temp.path().join("out");
    let config = ExtractionConfig::default().with_exclude_patterns(vec!["*.log".into()]);
    let report = extract_archive(&archive, &out, &config).unwrap();

    assert_eq!(report.files_extracted, 1);
    assert_eq!(report.skipped_count(SkipReason::Filtered), 2);
    assert_eq!(fs::read(out.join("build.log/keep.txt")).unwrap(), b"keep");
    assert!(!out.join("build.log/drop.log").exists());
    assert_eq!(names(&archive, &config), vec!["build.log/keep.txt"]);
}

#[test]
fn test_include_keeps_directories() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("s.tar");
    sample_tar(&archive);

    let config = ExtractionConfig::default().with_include_patterns(vec!["a.*".into()]);
    assert_eq!(
        names(&archive, &config),
        vec!["docs/", "docs/a.txt", "docs/a.log", "docs/cache/"]
    );
}

#[test]
fn test_exclude_wins_over_include() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("s.tar");
    sample_tar(&archive);

    let config = ExtractionConfig::default()
        .with_include_patterns(vec!["*.txt".into(), "*.log".into()])
        .with_exclude_patterns(vec!["a.*".into()]);
    assert_eq!(
        names(&archive, &config),
        vec!["docs/", "docs/b.txt", "docs/cache/", "docs/cache/c.txt"]
    );
}

#[test]
fn test_exclude_on_create() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    fs::create_dir_all(src.join("target/debug")).unwrap();
    fs::write(src.join("main.rs"), b"fn main() {}").unwrap();
    fs::write(src.join("notes.log"), b"log").unwrap();
    fs::write(src.join("target/debug/app"), b"bin").unwrap();

    let archive = temp.path().join("t.tar");
    let config = CreationConfig::default()
        .with_exclude_patterns(vec!["*.log".into(), "target".into()]);
    let report = create_archive(&archive, &[src.to_str().unwrap()], &config).unwrap();
    assert_eq!(report.files_added, 1);

    let listed = names(&archive, &ExtractionConfig::default());
    assert!(listed.iter().any(|n| n.ends_with("tree/main.rs")));
    assert!(!listed.iter().any(|n| n.contains("target") || n.ends_with(".log")));
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("s.tar");
    sample_tar(&archive);

    let config = ExtractionConfig::default().with_exclude_patterns(vec!["[".into()]);
    let err = extract_archive(&archive, temp.path().join("out"), &config).unwrap_err();
    assert!(matches!(err, ArchiveError::InvalidPattern { .. }));
    assert!(!temp.path().join("out").exists());
}

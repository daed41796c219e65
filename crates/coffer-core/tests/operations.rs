//! Listing, verification, overwrite and failure behavior across runs.

#![allow(clippy::unwrap_used)]

use coffer_core::ArchiveError;
use coffer_core::ExtractionConfig;
use coffer_core::SkipReason;
use coffer_core::create_archive;
use coffer_core::creation::ArchiveCreator;
use coffer_core::creation::CreationConfig;
use coffer_core::extract_archive;
use coffer_core::formats::ArchiveType;
use coffer_core::list_archive;
use coffer_core::test_utils::TarTestBuilder;
use coffer_core::test_utils::ZipTestBuilder;
use coffer_core::test_utils::replace_bytes;
use coffer_core::verify_archive;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_list_totals_and_repeatability() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("sizes.tar.xz");
    let src = temp.path().join("sizes");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("ten"), [1u8; 10]).unwrap();
    fs::write(src.join("zero"), []).unwrap();
    fs::write(src.join("kib"), [2u8; 1024]).unwrap();
    create_archive(&archive, &[src.to_str().unwrap()], &CreationConfig::default()).unwrap();

    let first = list_archive(&archive, &ExtractionConfig::default()).unwrap();
    let second = list_archive(&archive, &ExtractionConfig::default()).unwrap();
    assert_eq!(first.total_size, 1034);
    assert_eq!(first.total_entries, 4);
    assert_eq!(first, second);
}

#[test]
fn test_second_extraction_skips_then_overwrite_restores() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("a.tar.gz");
    let src = temp.path().join("data");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("file.txt"), b"original").unwrap();
    create_archive(&archive, &[src.to_str().unwrap()], &CreationConfig::default()).unwrap();

    let out = temp.path().join("out");
    let first = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(first.files_extracted, 1);

    let extracted = first_file(&out);
    fs::write(&extracted, b"edited").unwrap();

    let second = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(second.files_extracted, 0);
    assert!(second.skipped_count(SkipReason::AlreadyExists) >= 1);
    assert_eq!(fs::read(&extracted).unwrap(), b"edited");

    let config = ExtractionConfig::default().with_overwrite(true);
    let third = extract_archive(&archive, &out, &config).unwrap();
    assert_eq!(third.files_extracted, 1);
    assert!(third.skipped.is_empty());
    assert_eq!(fs::read(&extracted).unwrap(), b"original");
}

fn first_file(root: &std::path::Path) -> std::path::PathBuf {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .find(|e| e.file_type().is_file())
        .unwrap()
        .into_path()
}

#[test]
fn test_garbage_gzip_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("junk.tar.gz");
    fs::write(&archive, b"this was never a gzip stream").unwrap();

    let err = extract_archive(&archive, temp.path().join("out"), &ExtractionConfig::default())
        .unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptContainer(_)));

    let err = list_archive(&archive, &ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptContainer(_)));
}

#[test]
fn test_damaged_zip_member() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("crc.zip");
    let mut data = ZipTestBuilder::new()
        .add_file("ok.txt", b"healthy")
        .add_file("bad.txt", b"payload to damage")
        .build();
    replace_bytes(&mut data, b"damage", b"DAMAGE");
    fs::write(&archive, data).unwrap();

    let report = verify_archive(&archive, &ExtractionConfig::default()).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "bad.txt");

    let err = extract_archive(&archive, temp.path().join("out"), &ExtractionConfig::default())
        .unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    assert_eq!(fs::read(temp.path().join("out/ok.txt")).unwrap(), b"healthy");
}

#[test]
fn test_unsupported_entry_is_skipped() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("fifo.tar");
    TarTestBuilder::new()
        .add_entry_with_type("pipe", tar::EntryType::Fifo)
        .add_file("after.txt", b"still here")
        .write_to(&archive);

    let out = temp.path().join("out");
    let report = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(report.skipped_count(SkipReason::Unsupported), 1);
    assert!(out.join("after.txt").exists());
    assert!(!out.join("pipe").exists());
}

#[test]
fn test_nothing_to_archive() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("logs");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("x.log"), b"x").unwrap();

    let config = CreationConfig::default()
        .with_recursive(false)
        .with_exclude_patterns(vec!["logs".into()]);
    let err = create_archive(temp.path().join("o.tar"), &[src.to_str().unwrap()], &config)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::NothingToArchive));
}

#[test]
fn test_missing_source_is_write_failure() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("not-there");
    let err = create_archive(
        temp.path().join("o.zip"),
        &[missing.to_str().unwrap()],
        &CreationConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ArchiveError::WriteFailure { .. }));
    assert!(!temp.path().join("o.zip").exists());
}

#[test]
fn test_existing_output_requires_overwrite() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("in.txt");
    fs::write(&file, b"v1").unwrap();
    let archive = temp.path().join("o.tar");

    let creator = || {
        ArchiveCreator::new()
            .output(&archive)
            .add_source(file.to_str().unwrap())
    };
    creator().create().unwrap();

    let err = creator().create().unwrap_err();
    assert!(matches!(err, ArchiveError::OpenFailure { .. }));

    creator().overwrite(true).create().unwrap();
    let manifest = list_archive(&archive, &ExtractionConfig::default()).unwrap();
    assert_eq!(manifest.format, ArchiveType::Tar);
    assert_eq!(manifest.total_entries, 1);
}

//! High-level entry points for creating and extracting archives.

use std::path::Path;

use tracing::info;

use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::CreationConfig;
use crate::creation::CreationReport;
use crate::creation::collect_members;
use crate::creation::write_archive;
use crate::extraction::ExtractionEngine;
use crate::formats::open_decoder;
use crate::formats::resolve_format;
use crate::report::ProgressTracker;
use crate::types::DestDir;

/// Extracts an archive into `output_dir`, creating the directory if needed.
///
/// The format comes from `config.format` or, when unset, from the archive
/// file name. Unsafe, conflicting and unsupported entries are skipped and
/// listed in the report; see [`ExtractionReport::skipped`].
///
/// # Errors
///
/// - [`ArchiveError::OpenFailure`] if the archive cannot be opened.
/// - [`ArchiveError::CorruptContainer`] if the archive is damaged.
/// - [`ArchiveError::UnsafePath`] when `config.strict_paths` is on and a
///   member name is unsafe.
/// - [`ArchiveError::Io`] if the destination cannot be written.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::ExtractionConfig;
/// use coffer_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("archive.tar.gz", "out", &ExtractionConfig::default())?;
/// println!("extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
) -> Result<ExtractionReport> {
    extract_archive_with_progress(archive_path, output_dir, config, &mut NoopProgress)
}

/// Same as [`extract_archive`], reporting each entry to `progress`.
///
/// The entry count is not known up front, so the total handed to
/// [`ProgressCallback::on_entry_start`] is always zero.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let archive_path = archive_path.as_ref();
    config.validate()?;
    let format = resolve_format(archive_path, config.format)?;
    let mut decoder = open_decoder(archive_path, format)?;

    let dest = DestDir::create(output_dir.as_ref())?;
    let mut engine = ExtractionEngine::new(dest, config)?;
    let mut tracker = ProgressTracker::new(progress, 0);

    decoder.visit(&mut |entry, payload| engine.process(entry, payload, &mut tracker))?;
    tracker.on_complete();

    let report = engine.finish();
    info!(
        archive = %archive_path.display(),
        files = report.files_extracted,
        directories = report.directories_created,
        skipped = report.entries_skipped(),
        bytes = report.bytes_written,
        "extracted"
    );
    Ok(report)
}

/// Creates an archive at `output_path` from `sources`.
///
/// Each source is a file, a directory or a glob pattern. The format comes
/// from `config.format` or, when unset, from the output file name.
///
/// # Errors
///
/// - [`ArchiveError::NothingToArchive`] if no member survives the walk.
/// - [`ArchiveError::WriteFailure`] if a literal source is missing or a
///   source cannot be read.
/// - [`ArchiveError::OpenFailure`] if the output exists and
///   `config.overwrite` is off.
/// - [`ArchiveError::UnsupportedFormat`] if the format cannot be
///   determined.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::create_archive;
/// use coffer_core::creation::CreationConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CreationConfig::default();
/// let report = create_archive("output.tar.gz", &["src", "Cargo.toml"], &config)?;
/// println!("added {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, S: AsRef<str>>(
    output_path: P,
    sources: &[S],
    config: &CreationConfig,
) -> Result<CreationReport> {
    create_archive_with_progress(output_path, sources, config, &mut NoopProgress)
}

/// Same as [`create_archive`], reporting each member to `progress`.
///
/// # Errors
///
/// See [`create_archive`].
pub fn create_archive_with_progress<P: AsRef<Path>, S: AsRef<str>>(
    output_path: P,
    sources: &[S],
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let output = output_path.as_ref();
    config.validate()?;
    let archive_type = resolve_format(output, config.format)?;

    let walk = collect_members(sources, config, archive_type.format().supports_hardlinks())?;
    if walk.members.is_empty() {
        return Err(ArchiveError::NothingToArchive);
    }

    let mut report = write_archive(output, &walk.members, archive_type, config, progress)?;
    let mut warnings = walk.warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::RecordingProgress;
    use crate::SkipReason;
    use crate::formats::ArchiveType;
    use crate::test_utils::TarTestBuilder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_creates_destination() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        TarTestBuilder::new().add_file("f.txt", b"hi").write_to(&archive);

        let out = temp.path().join("new/nested/out");
        let report = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
        assert_eq!(report.files_extracted, 1);
        assert_eq!(fs::read(out.join("f.txt")).unwrap(), b"hi");
    }

    #[test]
    fn test_extract_missing_archive_leaves_no_destination() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let err = extract_archive(temp.path().join("none.tar"), &out, &ExtractionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ArchiveError::OpenFailure { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_extract_reports_progress() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("p.tar");
        TarTestBuilder::new()
            .add_file("keep.txt", b"1234")
            .add_raw_name("../evil", b"x")
            .write_to(&archive);

        let mut progress = RecordingProgress::default();
        let report = extract_archive_with_progress(
            &archive,
            temp.path().join("out"),
            &ExtractionConfig::default(),
            &mut progress,
        )
        .unwrap();

        assert_eq!(report.skipped_count(SkipReason::UnsafePath), 1);
        assert_eq!(progress.completed.len(), 1);
        assert_eq!(progress.skipped.len(), 1);
        assert_eq!(progress.bytes, 4);
        assert!(progress.finished);
    }

    #[test]
    fn test_create_then_extract() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/data.bin"), [7u8; 300]).unwrap();

        let archive = temp.path().join("out.tar.gz");
        let created = create_archive(
            &archive,
            &[src.to_str().unwrap()],
            &CreationConfig::default(),
        )
        .unwrap();
        assert_eq!(created.files_added, 1);

        let out = temp.path().join("x");
        let report = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
        assert_eq!(report.files_extracted, 1);
        let base = src.strip_prefix("/").unwrap_or(&src);
        assert_eq!(fs::read(out.join(base).join("sub/data.bin")).unwrap(), [7u8; 300]);
    }

    #[test]
    fn test_create_nothing_to_archive() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("only.log"), b"x").unwrap();
        let pattern = temp.path().join("*.txt");

        let err = create_archive(
            temp.path().join("empty.tar"),
            &[pattern.to_str().unwrap()],
            &CreationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::NothingToArchive));
        assert!(!temp.path().join("empty.tar").exists());
    }

    #[test]
    fn test_create_explicit_format_ignores_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        fs::write(&file, b"abc").unwrap();
        let archive = temp.path().join("bundle.bin");

        let config = CreationConfig::default().with_format(Some(ArchiveType::Zip));
        create_archive(&archive, &[file.to_str().unwrap()], &config).unwrap();

        let manifest = crate::list_archive(
            &archive,
            &ExtractionConfig::default().with_format(Some(ArchiveType::Zip)),
        )
        .unwrap();
        assert_eq!(manifest.format, ArchiveType::Zip);
        assert_eq!(manifest.total_size, 3);
    }

    #[test]
    fn test_create_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        fs::write(&file, b"abc").unwrap();
        let err = create_archive(
            temp.path().join("out.rar"),
            &[file.to_str().unwrap()],
            &CreationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat { .. }));
    }
}

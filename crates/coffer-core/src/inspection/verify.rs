//! Archive integrity check.
//!
//! Every payload is read to its end. Zip readers check the stored CRC-32
//! while doing so, so a damaged zip member fails on its own and the check
//! moves on to the next one. Tar has no per-entry checksum over payloads; a
//! short or unreadable tar stream is reported as a damaged container.

use std::path::Path;

use tracing::info;
use tracing::warn;

use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::drain;
use crate::formats::ArchiveType;
use crate::formats::ContainerKind;
use crate::formats::open_decoder;
use crate::formats::resolve_format;

/// A member that failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Member name as stored.
    pub name: String,
    /// What went wrong.
    pub message: String,
}

/// Outcome of [`verify_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Archive type that was read.
    pub format: ArchiveType,
    /// Members whose payload was read.
    pub entries_checked: usize,
    /// Payload bytes read.
    pub bytes_checked: u64,
    /// Members that failed.
    pub failures: Vec<EntryFailure>,
}

impl VerificationReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new(format: ArchiveType) -> Self {
        Self {
            format,
            entries_checked: 0,
            bytes_checked: 0,
            failures: Vec::new(),
        }
    }

    /// Returns `true` if no member failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reads every payload of an archive and checks it against the recorded
/// size and, for zip, the recorded CRC-32.
///
/// Include and exclude patterns in `config` restrict which members are
/// checked; filtered payloads are still read past, not verified.
///
/// # Errors
///
/// - [`ArchiveError::OpenFailure`] if the archive cannot be opened.
/// - [`ArchiveError::CorruptContainer`] if the container itself is damaged.
///   For tar this includes a short payload.
///
/// Damaged zip members do not fail the call; they are listed in
/// [`VerificationReport::failures`].
///
/// # Examples
///
/// ```no_run
/// use coffer_core::{ExtractionConfig, verify_archive};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_archive("backup.zip", &ExtractionConfig::default())?;
/// for failure in &report.failures {
///     eprintln!("{}: {}", failure.name, failure.message);
/// }
/// # Ok(())
/// # }
/// ```
pub fn verify_archive<P: AsRef<Path>>(
    archive_path: P,
    config: &ExtractionConfig,
) -> Result<VerificationReport> {
    let archive_path = archive_path.as_ref();
    let format = resolve_format(archive_path, config.format)?;
    let filter = config.name_filter()?;
    let per_entry = format.container() == ContainerKind::Zip;
    let mut decoder = open_decoder(archive_path, format)?;

    let mut report = VerificationReport::new(format);
    let mut buffer = CopyBuffer::new();
    decoder.visit(&mut |entry, payload| {
        if !entry.kind.is_file() || !filter.allows(&entry.name, false) {
            return Ok(());
        }

        let outcome = drain(payload, &mut buffer).and_then(|read| {
            if read == entry.size {
                Ok(read)
            } else {
                Err(ArchiveError::CorruptContainer(format!(
                    "{}: payload is {read} bytes, header says {}",
                    entry.name, entry.size
                )))
            }
        });

        report.entries_checked += 1;
        match outcome {
            Ok(read) => {
                report.bytes_checked += read;
                Ok(())
            }
            Err(err) if per_entry => {
                warn!(entry = %entry.name, error = %err, "member failed verification");
                report.failures.push(EntryFailure {
                    name: entry.name.clone(),
                    message: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    })?;

    info!(
        archive = %archive_path.display(),
        checked = report.entries_checked,
        failed = report.failures.len(),
        "verified"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::replace_bytes;
    use tempfile::TempDir;

    #[test]
    fn test_verify_clean_tar() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ok.tar");
        TarTestBuilder::new()
            .add_directory("d/")
            .add_file("d/a", b"hello")
            .add_file("d/b", &[0u8; 2000])
            .write_to(&path);

        let report = verify_archive(&path, &ExtractionConfig::default()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.entries_checked, 2);
        assert_eq!(report.bytes_checked, 2005);
    }

    #[test]
    fn test_verify_truncated_tar_fails_whole_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cut.tar");
        let mut data = TarTestBuilder::new().add_file("big", &[1u8; 8192]).build();
        data.truncate(512 + 1024);
        std::fs::write(&path, data).unwrap();

        let err = verify_archive(&path, &ExtractionConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    }

    #[test]
    fn test_verify_zip_reports_damaged_member() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.zip");
        let mut data = ZipTestBuilder::new()
            .add_file("good.txt", b"all fine here")
            .add_file("bad.txt", b"original payload")
            .build();
        replace_bytes(&mut data, b"original", b"tampered");
        std::fs::write(&path, data).unwrap();

        let report = verify_archive(&path, &ExtractionConfig::default()).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.entries_checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad.txt");
    }

    #[test]
    fn test_verify_respects_filters() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.zip");
        let mut data = ZipTestBuilder::new()
            .add_file("keep.txt", b"keep")
            .add_file("skip.log", b"damaged!")
            .build();
        replace_bytes(&mut data, b"damaged!", b"DAMAGED!");
        std::fs::write(&path, data).unwrap();

        let config = ExtractionConfig::default().with_exclude_patterns(vec!["*.log".into()]);
        let report = verify_archive(&path, &config).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.entries_checked, 1);
    }
}

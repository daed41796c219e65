//! Error conversion utilities for the CLI.
//!
//! Turns coffer-core's typed errors into contextual `anyhow` errors that
//! end with an actionable hint.

use anyhow::anyhow;
use coffer_core::ArchiveError;
use std::io::ErrorKind;
use std::path::Path;

/// Raised by `unzip -t` after the report has been printed.
#[derive(Debug)]
pub struct VerificationFailed {
    pub failures: usize,
}

impl std::fmt::Display for VerificationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} member(s) failed verification", self.failures)
    }
}

impl std::error::Error for VerificationFailed {}

/// Converts an `ArchiveError` into a user-facing error for `archive`.
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err {
        ArchiveError::OpenFailure { path, source } if source.kind() == ErrorKind::AlreadyExists => {
            anyhow!(
                "Archive '{}' already exists\n\
                 HINT: Pass --force to replace it.",
                path.display()
            )
        }
        ArchiveError::OpenFailure { path, source } => {
            anyhow!(
                "Cannot open '{}': {}\n\
                 HINT: Check that the file exists and that you have permission to read it.",
                path.display(),
                source
            )
        }
        ArchiveError::WriteFailure { path, source } => {
            anyhow!(
                "Failed to write '{}' while creating '{}': {}\n\
                 HINT: Check that every input path exists and is readable.",
                path.display(),
                archive.display(),
                source
            )
        }
        ArchiveError::CorruptContainer(reason) => {
            anyhow!(
                "Archive '{}' is damaged: {}\n\
                 HINT: The archive may be truncated or not in the format its name suggests.",
                archive.display(),
                reason
            )
        }
        ArchiveError::UnsafePath { path, reason } => {
            anyhow!(
                "Security violation: archive '{}' contains unsafe member '{}' ({})\n\
                 HINT: Run without --strict to skip unsafe members and extract the rest.",
                archive.display(),
                path.display(),
                reason
            )
        }
        ArchiveError::NothingToArchive => {
            anyhow!(
                "Nothing to archive: no input matched\n\
                 HINT: Check the paths and the exclude/include patterns."
            )
        }
        ArchiveError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid pattern '{pattern}': {reason}\n\
                 HINT: Patterns use glob syntax (*, ?, [abc]); quote them to stop the shell expanding them."
            )
        }
        ArchiveError::UnsupportedFormat { reason } => {
            anyhow!(
                "Unsupported archive format for '{}': {}\n\
                 HINT: Supported formats: tar, tar.gz, tar.bz2, tar.xz, tar.zst, zip",
                archive.display(),
                reason
            )
        }
        ArchiveError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Converts the error side of a core result.
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_core::PathViolation;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_unsafe_path_error() {
        let err = ArchiveError::UnsafePath {
            path: PathBuf::from("../../etc/passwd"),
            reason: PathViolation::ParentTraversal,
        };
        let converted = convert_archive_error(err, Path::new("evil.tar"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("evil.tar"));
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("--strict"));
    }

    #[test]
    fn test_existing_archive_suggests_force() {
        let err = ArchiveError::OpenFailure {
            path: PathBuf::from("out.zip"),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "exists"),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("out.zip")));
        assert!(msg.contains("already exists"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_nothing_to_archive_has_hint() {
        let msg = format!(
            "{:?}",
            convert_archive_error(ArchiveError::NothingToArchive, Path::new("o.tar"))
        );
        assert!(msg.contains("Nothing to archive"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_fallback_keeps_context() {
        let err = ArchiveError::AlreadyExists {
            path: PathBuf::from("a.txt"),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("a.tar")));
        assert!(msg.contains("Error processing archive 'a.tar'"));
        assert!(msg.contains("already exists: a.txt"));
    }

    #[test]
    fn test_verification_failed_message() {
        let err = VerificationFailed { failures: 2 };
        assert_eq!(err.to_string(), "2 member(s) failed verification");
    }
}

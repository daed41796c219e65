//! Error types for archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// The rule an unsafe member name broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    /// The name is absolute (leading `/` or a drive prefix).
    Absolute,
    /// The name contains a `..` segment.
    ParentTraversal,
    /// The name contains a NUL byte.
    NullByte,
    /// The name normalizes to nothing.
    Empty,
    /// The name resolves outside the extraction root through an existing
    /// symlink.
    EscapesRoot,
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute => write!(f, "absolute path"),
            Self::ParentTraversal => write!(f, "parent directory segment"),
            Self::NullByte => write!(f, "null byte in name"),
            Self::Empty => write!(f, "empty name"),
            Self::EscapesRoot => write!(f, "resolves outside the extraction root"),
        }
    }
}

/// Errors that can occur while creating, reading or extracting archives.
///
/// Variants split into two groups. Per-entry errors ([`UnsafePath`],
/// [`AlreadyExists`], [`UnsupportedEntryKind`], [`MissingLinkTarget`]) are
/// caught by the extraction loop and turned into skips. Everything else
/// aborts the operation.
///
/// [`UnsafePath`]: ArchiveError::UnsafePath
/// [`AlreadyExists`]: ArchiveError::AlreadyExists
/// [`UnsupportedEntryKind`]: ArchiveError::UnsupportedEntryKind
/// [`MissingLinkTarget`]: ArchiveError::MissingLinkTarget
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive container could not be opened or created.
    #[error("cannot open {path}: {source}")]
    OpenFailure {
        /// Archive path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error interrupted archive creation.
    #[error("write failed for {path}: {source}")]
    WriteFailure {
        /// Member or archive path being written when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The container could not be decoded.
    #[error("corrupt archive: {0}")]
    CorruptContainer(String),

    /// A member name would escape the extraction root.
    #[error("unsafe path {path}: {reason}")]
    UnsafePath {
        /// The offending member name.
        path: PathBuf,
        /// Which rule the name broke.
        reason: PathViolation,
    },

    /// The extraction target already exists and overwrite is off.
    #[error("already exists: {path}")]
    AlreadyExists {
        /// Target path.
        path: PathBuf,
    },

    /// The entry kind cannot be materialized.
    #[error("unsupported entry kind '{kind}' for {path}")]
    UnsupportedEntryKind {
        /// Member name.
        path: PathBuf,
        /// Human readable kind description.
        kind: String,
    },

    /// A hardlink points at a member that was not extracted.
    #[error("hardlink {path} points at missing target {target}")]
    MissingLinkTarget {
        /// Link member name.
        path: PathBuf,
        /// Stored link target.
        target: PathBuf,
    },

    /// The walker produced no members.
    #[error("nothing to archive: no input matched")]
    NothingToArchive,

    /// A glob pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// Archive format is unknown or the requested combination is unsupported.
    #[error("unsupported archive format: {reason}")]
    UnsupportedFormat {
        /// What was not supported.
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for the configuration error.
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Returns `true` if the error is handled per entry during extraction.
    ///
    /// # Examples
    ///
    /// ```
    /// use coffer_core::ArchiveError;
    /// use std::path::PathBuf;
    ///
    /// let err = ArchiveError::AlreadyExists {
    ///     path: PathBuf::from("notes.txt"),
    /// };
    /// assert!(err.is_per_entry());
    /// assert!(!ArchiveError::NothingToArchive.is_per_entry());
    /// ```
    #[must_use]
    pub const fn is_per_entry(&self) -> bool {
        matches!(
            self,
            Self::UnsafePath { .. }
                | Self::AlreadyExists { .. }
                | Self::UnsupportedEntryKind { .. }
                | Self::MissingLinkTarget { .. }
        )
    }

    /// Returns `true` if this error is a path safety violation.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::UnsafePath { .. })
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn context(&self) -> Option<&std::path::Path> {
        match self {
            Self::OpenFailure { path, .. }
            | Self::WriteFailure { path, .. }
            | Self::UnsafePath { path, .. }
            | Self::AlreadyExists { path }
            | Self::UnsupportedEntryKind { path, .. }
            | Self::MissingLinkTarget { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn corrupt(err: impl std::fmt::Display) -> Self {
        Self::CorruptContainer(err.to_string())
    }
}

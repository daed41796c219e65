//! Archive type detection from file names.

use std::path::Path;

use super::Compression;
use super::ContainerFormat;
use super::TarFormat;
use super::ZipFormat;
use crate::ArchiveError;
use crate::Result;

static TAR: TarFormat = TarFormat;
static ZIP: ZipFormat = ZipFormat;

/// Container family, independent of any outer compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// tar.
    Tar,
    /// zip.
    Zip,
}

impl ContainerKind {
    /// Returns the format implementation.
    #[must_use]
    pub fn format(self) -> &'static dyn ContainerFormat {
        match self {
            Self::Tar => &TAR,
            Self::Zip => &ZIP,
        }
    }
}

/// Supported archive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// ZIP archive.
    Zip,
}

impl ArchiveType {
    /// Combines a container and an outer filter.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsupportedFormat`] for zip with a filter.
    pub fn from_parts(container: ContainerKind, compression: Compression) -> Result<Self> {
        match (container, compression) {
            (ContainerKind::Tar, Compression::None) => Ok(Self::Tar),
            (ContainerKind::Tar, Compression::Gzip) => Ok(Self::TarGz),
            (ContainerKind::Tar, Compression::Bzip2) => Ok(Self::TarBz2),
            (ContainerKind::Tar, Compression::Xz) => Ok(Self::TarXz),
            (ContainerKind::Tar, Compression::Zstd) => Ok(Self::TarZst),
            (ContainerKind::Zip, Compression::None) => Ok(Self::Zip),
            (ContainerKind::Zip, other) => Err(ArchiveError::UnsupportedFormat {
                reason: format!("zip cannot be wrapped in {other}"),
            }),
        }
    }

    /// Container family.
    #[must_use]
    pub const fn container(self) -> ContainerKind {
        match self {
            Self::Zip => ContainerKind::Zip,
            _ => ContainerKind::Tar,
        }
    }

    /// Outer compression filter.
    #[must_use]
    pub const fn compression(self) -> Compression {
        match self {
            Self::Tar | Self::Zip => Compression::None,
            Self::TarGz => Compression::Gzip,
            Self::TarBz2 => Compression::Bzip2,
            Self::TarXz => Compression::Xz,
            Self::TarZst => Compression::Zstd,
        }
    }

    /// Format implementation for this type.
    #[must_use]
    pub fn format(self) -> &'static dyn ContainerFormat {
        self.container().format()
    }

    /// Conventional file extension, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::TarZst => "tar.zst",
            Self::Zip => "zip",
        }
    }
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Detects the archive type from a file path.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] if the extension is unknown.
///
/// # Examples
///
/// ```
/// use coffer_core::formats::{ArchiveType, detect_format};
/// use std::path::Path;
///
/// assert_eq!(detect_format(Path::new("backup.tgz"))?, ArchiveType::TarGz);
/// assert!(detect_format(Path::new("notes.txt")).is_err());
/// # Ok::<(), coffer_core::ArchiveError>(())
/// ```
pub fn detect_format(path: &Path) -> Result<ArchiveType> {
    let unsupported = || ArchiveError::UnsupportedFormat {
        reason: format!("cannot infer archive type of {}", path.display()),
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(unsupported)?
        .to_ascii_lowercase();

    match extension.as_str() {
        "tar" => Ok(ArchiveType::Tar),
        "gz" | "tgz" => Ok(ArchiveType::TarGz),
        "bz2" | "tbz" | "tbz2" => Ok(ArchiveType::TarBz2),
        "xz" | "txz" => Ok(ArchiveType::TarXz),
        "zst" | "tzst" => Ok(ArchiveType::TarZst),
        "zip" => Ok(ArchiveType::Zip),
        _ => Err(unsupported()),
    }
}

/// Uses `explicit` when given, otherwise detects the type from `path`.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] if no type is given and the
/// extension is unknown.
pub fn resolve_format(path: &Path, explicit: Option<ArchiveType>) -> Result<ArchiveType> {
    explicit.map_or_else(|| detect_format(path), Ok)
}

//! Archive member (write side) and entry (read side) records.

use std::path::PathBuf;

/// Kind of object an archive member represents.
///
/// # Examples
///
/// ```
/// use coffer_core::types::EntryKind;
///
/// assert_eq!(EntryKind::Directory.type_char(), 'd');
/// assert!(EntryKind::Other(b'3').is_other());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with a payload.
    File,
    /// Directory.
    Directory,
    /// Symbolic link; the target is stored, not the pointee.
    Symlink,
    /// Hard link to an earlier member of the same archive.
    Hardlink,
    /// Any other container entry type, identified by its type flag.
    Other(u8),
}

impl EntryKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a symlink or hardlink.
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::Symlink | Self::Hardlink)
    }

    /// Returns `true` for kinds the engine cannot materialize.
    #[must_use]
    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }

    /// Single-character type marker used in listings (`ls -l` style).
    #[must_use]
    pub const fn type_char(&self) -> char {
        match self {
            Self::File => '-',
            Self::Directory => 'd',
            Self::Symlink => 'l',
            Self::Hardlink => 'h',
            Self::Other(_) => '?',
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symlink"),
            Self::Hardlink => write!(f, "hardlink"),
            Self::Other(flag) if flag.is_ascii_graphic() => {
                write!(f, "type '{}'", char::from(*flag))
            }
            Self::Other(flag) => write!(f, "type {flag:#04x}"),
        }
    }
}

/// Payload encoding of a zip entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMethod {
    /// Raw bytes.
    Stored,
    /// Deflate-compressed bytes.
    Deflated,
    /// Any other method the container reports.
    Other,
}

impl std::fmt::Display for StorageMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "Stored"),
            Self::Deflated => write!(f, "Deflate"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A filesystem object about to be written into an archive.
///
/// Produced by the member walker from `lstat` metadata and consumed once by
/// the archive writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Filesystem path the member was read from.
    pub source: PathBuf,
    /// Relative, `/`-separated name stored in the archive.
    pub name: String,
    /// Member kind.
    pub kind: EntryKind,
    /// Permission bits.
    pub mode: u32,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    /// Link target for symlinks and hardlinks.
    pub link_target: Option<String>,
    /// Payload length; zero for everything but regular files.
    pub size: u64,
    /// Owner user id.
    pub uid: u64,
    /// Owner group id.
    pub gid: u64,
}

/// An entry decoded from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name as stored in the archive. Untrusted.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits as stored.
    pub mode: u32,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    /// Link target for symlinks and hardlinks. Untrusted.
    pub link_target: Option<String>,
    /// Uncompressed payload length.
    pub size: u64,
    /// Stored payload length, for containers that compress per entry.
    pub compressed_size: Option<u64>,
    /// Per-entry payload encoding, for containers that record one.
    pub method: Option<StorageMethod>,
    /// Stored CRC-32 of the payload, when the container keeps one.
    pub crc32: Option<u32>,
    /// Owner user id, when recorded.
    pub uid: Option<u64>,
    /// Owner group id, when recorded.
    pub gid: Option<u64>,
}

impl ArchiveEntry {
    /// Creates an entry with only the fields every container records.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            mode: 0,
            mtime: 0,
            link_target: None,
            size,
            compressed_size: None,
            method: None,
            crc32: None,
            uid: None,
            gid: None,
        }
    }

    /// Permission bits with a fallback for containers that did not record
    /// any.
    #[must_use]
    pub fn effective_mode(&self) -> u32 {
        match self.mode & 0o7777 {
            0 if self.kind.is_directory() => 0o755,
            0 => 0o644,
            mode => mode,
        }
    }
}

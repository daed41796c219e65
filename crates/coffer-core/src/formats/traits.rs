//! Capability traits implemented by each container format.

use std::fs::File;
use std::io;
use std::io::Read;

use super::Compression;
use crate::Result;
use crate::types::ArchiveEntry;
use crate::types::ArchiveMember;

/// Settings handed to [`ContainerFormat::encoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Outer compression filter. Must be [`Compression::None`] for formats
    /// that do not support one.
    pub compression: Compression,
    /// Compression level on the 1-9 scale; 0 asks for stored entries where
    /// the format compresses per entry.
    pub level: Option<u8>,
}

/// Callback invoked once per decoded entry with a reader over its payload.
///
/// The payload does not have to be consumed; the decoder discards whatever
/// is left before moving on.
pub type EntryVisitor<'v> = dyn FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()> + 'v;

/// A sequential archive container.
pub trait ContainerFormat: Sync {
    /// Short format name.
    fn name(&self) -> &'static str;

    /// Whether the container can be wrapped in an outer compression filter.
    fn supports_compression(&self) -> bool;

    /// Whether the container can store hardlinks.
    fn supports_hardlinks(&self) -> bool;

    /// Starts writing a new archive into `file`.
    fn encoder(&self, file: File, options: EncoderOptions) -> Result<Box<dyn EntryEncoder>>;

    /// Opens an existing archive for sequential reading.
    fn decoder(&self, file: File, compression: Compression) -> Result<Box<dyn EntryDecoder>>;
}

/// Write half of a container: header plus payload per member.
pub trait EntryEncoder {
    /// Writes the header for `member` and, for regular files, exactly
    /// `member.size` bytes read from `payload`.
    fn append(&mut self, member: &ArchiveMember, payload: Option<&mut dyn Read>)
    -> io::Result<()>;

    /// Writes the container trailer, closes the compression filter and
    /// returns the underlying file, in that order.
    fn finish(self: Box<Self>) -> io::Result<File>;
}

/// Read half of a container.
pub trait EntryDecoder {
    /// Visits every entry in archive order.
    ///
    /// Decode errors surface as [`crate::ArchiveError::CorruptContainer`];
    /// errors returned by the visitor are propagated unchanged.
    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()>;
}

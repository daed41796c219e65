//! Container formats and the compression filters around them.
//!
//! Both containers sit behind [`ContainerFormat`], so the writer, reader and
//! extraction engine never branch on tar versus zip.

pub mod compression;
pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

pub use compression::Compression;
pub use detect::ArchiveType;
pub use detect::ContainerKind;
pub use detect::detect_format;
pub use detect::resolve_format;
pub use tar::TarFormat;
pub use traits::ContainerFormat;
pub use traits::EncoderOptions;
pub use traits::EntryDecoder;
pub use traits::EntryEncoder;
pub use traits::EntryVisitor;
pub use zip::ZipFormat;

/// Opens `path` and returns a decoder for `archive_type`.
///
/// # Errors
///
/// Returns [`crate::ArchiveError::OpenFailure`] if the file cannot be
/// opened, or [`crate::ArchiveError::CorruptContainer`] if the container
/// header cannot be read.
pub fn open_decoder(
    path: &std::path::Path,
    archive_type: ArchiveType,
) -> crate::Result<Box<dyn EntryDecoder>> {
    let file = std::fs::File::open(path).map_err(|source| crate::ArchiveError::OpenFailure {
        path: path.to_path_buf(),
        source,
    })?;
    archive_type
        .format()
        .decoder(file, archive_type.compression())
}

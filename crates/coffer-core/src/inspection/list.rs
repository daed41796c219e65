//! Archive listing.

use std::path::Path;

use tracing::info;

use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::drain;
use crate::formats::open_decoder;
use crate::formats::resolve_format;
use crate::inspection::manifest::ArchiveManifest;

/// Lists archive contents without writing anything to disk.
///
/// Only the include/exclude patterns and the format of `config` are used.
/// The payload of every listed file is read and discarded, so a short
/// payload or a zip CRC mismatch fails the listing. Use
/// [`crate::verify_archive`] to report damaged zip members one by one.
///
/// # Errors
///
/// - [`crate::ArchiveError::OpenFailure`] if the archive cannot be opened.
/// - [`crate::ArchiveError::CorruptContainer`] on a decode error or a
///   payload that does not match its header.
/// - [`crate::ArchiveError::UnsupportedFormat`] if the type is unknown.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::{ExtractionConfig, list_archive};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manifest = list_archive("archive.tar.gz", &ExtractionConfig::default())?;
/// for entry in &manifest.entries {
///     println!("{} {}", entry.size, entry.name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(
    archive_path: P,
    config: &ExtractionConfig,
) -> Result<ArchiveManifest> {
    let archive_path = archive_path.as_ref();
    let format = resolve_format(archive_path, config.format)?;
    let filter = config.name_filter()?;
    let mut decoder = open_decoder(archive_path, format)?;

    let mut manifest = ArchiveManifest::new(format);
    let mut buffer = CopyBuffer::new();
    decoder.visit(&mut |entry, payload| {
        if !filter.allows(&entry.name, entry.kind.is_directory()) {
            return Ok(());
        }
        if entry.kind.is_file() {
            let read = drain(payload, &mut buffer).map_err(|err| match err {
                ArchiveError::CorruptContainer(message) => {
                    ArchiveError::CorruptContainer(format!("{}: {message}", entry.name))
                }
                other => other,
            })?;
            if read != entry.size {
                return Err(ArchiveError::CorruptContainer(format!(
                    "{}: payload is {read} bytes, header says {}",
                    entry.name, entry.size
                )));
            }
        }
        manifest.add_entry(entry.clone());
        Ok(())
    })?;

    info!(
        archive = %archive_path.display(),
        entries = manifest.total_entries,
        bytes = manifest.total_size,
        "listed"
    );
    Ok(manifest)
}

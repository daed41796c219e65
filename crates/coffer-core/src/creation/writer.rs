//! Archive writer: serializes walked members into one container.
//!
//! The container is written to a temporary file next to the output and
//! renamed into place only after the trailer, the compression filter and the
//! file have been flushed. Any failure before that leaves no file behind.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ArchiveError;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::ExactReader;
use crate::creation::config::CreationConfig;
use crate::creation::report::CreationReport;
use crate::formats::ArchiveType;
use crate::formats::EncoderOptions;
use crate::formats::EntryEncoder;
use crate::report::ProgressTracker;
use crate::security::permissions::apply_mode;
use crate::types::ArchiveMember;

const ARCHIVE_MODE: u32 = 0o644;

/// Writes `members` to `output` as `archive_type`.
///
/// Members are written in the given order. Regular files are re-opened and
/// streamed with exactly the size recorded by the walker; a file that
/// shrank in the meantime fails the whole operation.
///
/// # Errors
///
/// - [`ArchiveError::OpenFailure`] if `output` exists and
///   `config.overwrite` is off, or the temporary file cannot be created.
/// - [`ArchiveError::WriteFailure`] if a source cannot be read or the
///   archive cannot be written.
/// - [`ArchiveError::UnsupportedFormat`] for zip with an outer filter.
pub fn write_archive(
    output: &Path,
    members: &[ArchiveMember],
    archive_type: ArchiveType,
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let start = Instant::now();
    let open_failure = |source: io::Error| ArchiveError::OpenFailure {
        path: output.to_path_buf(),
        source,
    };

    let existing = match std::fs::symlink_metadata(output) {
        Ok(_) if !config.overwrite => {
            return Err(open_failure(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "archive already exists",
            )));
        }
        Ok(_) => output.canonicalize().ok(),
        Err(_) => None,
    };

    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".coffer-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(open_failure)?;
    let handle = temp.as_file().try_clone().map_err(open_failure)?;

    let mut encoder = archive_type.format().encoder(
        handle,
        EncoderOptions {
            compression: archive_type.compression(),
            level: config.compression_level,
        },
    )?;
    debug!(
        archive = %output.display(),
        format = %archive_type,
        temp = %temp.path().display(),
        "writing"
    );

    let mut report = CreationReport::new();
    let mut tracker = ProgressTracker::new(progress, members.len());

    for member in members {
        if existing
            .as_deref()
            .is_some_and(|out| member.source.canonicalize().is_ok_and(|p| p == out))
        {
            let message = format!("{}: file is the archive; not dumped", member.name);
            warn!("{message}");
            report.add_warning(message);
            continue;
        }

        let name = Path::new(&member.name);
        tracker.on_entry_start(name);
        append_member(encoder.as_mut(), member)?;

        let payload = if member.kind.is_file() { member.size } else { 0 };
        report.record(member.kind, payload);
        tracker.on_bytes_written(payload);
        tracker.on_entry_complete(name);
        debug!(name = %member.name, kind = %member.kind, size = payload, "added");
    }

    let write_failure = |source: io::Error| ArchiveError::WriteFailure {
        path: output.to_path_buf(),
        source,
    };
    drop(encoder.finish().map_err(write_failure)?);

    report.bytes_compressed = temp.as_file().metadata().map_err(write_failure)?.len();
    apply_mode(temp.path(), ARCHIVE_MODE).map_err(write_failure)?;

    let persisted = if config.overwrite {
        temp.persist(output)
    } else {
        temp.persist_noclobber(output)
    };
    persisted.map_err(|err| write_failure(err.error))?;

    tracker.on_complete();
    report.duration = start.elapsed();
    info!(
        archive = %output.display(),
        entries = report.entries_written(),
        bytes = report.bytes_written,
        archive_bytes = report.bytes_compressed,
        "archive created"
    );
    Ok(report)
}

fn append_member(encoder: &mut dyn EntryEncoder, member: &ArchiveMember) -> Result<()> {
    let failure = |source: io::Error| ArchiveError::WriteFailure {
        path: member.source.clone(),
        source,
    };

    if member.kind.is_file() {
        let file = File::open(&member.source).map_err(failure)?;
        let mut reader = ExactReader::new(BufReader::new(file), member.size);
        encoder.append(member, Some(&mut reader)).map_err(failure)
    } else {
        encoder.append(member, None).map_err(failure)
    }
}

/// Appends the conventional extension for `archive_type` when `path` has no
/// extension at all.
#[must_use]
pub fn with_default_extension(path: &Path, archive_type: ArchiveType) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(archive_type.extension());
        PathBuf::from(name)
    }
}

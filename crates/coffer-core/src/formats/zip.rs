//! Zip container with per-entry stored or deflated payloads.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;

use chrono::Datelike;
use chrono::Timelike;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::Compression;
use super::ContainerFormat;
use super::EncoderOptions;
use super::EntryDecoder;
use super::EntryEncoder;
use super::EntryVisitor;
use crate::ArchiveError;
use crate::Result;
use crate::types::ArchiveEntry;
use crate::types::ArchiveMember;
use crate::types::EntryKind;
use crate::types::StorageMethod;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;
const MAX_LINK_TARGET: u64 = 4096;
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Central-directory zip container. Compresses per entry, so it takes no
/// outer filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipFormat;

impl ContainerFormat for ZipFormat {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn supports_compression(&self) -> bool {
        false
    }

    fn supports_hardlinks(&self) -> bool {
        false
    }

    fn encoder(&self, file: File, options: EncoderOptions) -> Result<Box<dyn EntryEncoder>> {
        if options.compression.is_compressed() {
            return Err(ArchiveError::UnsupportedFormat {
                reason: format!("zip cannot be wrapped in {}", options.compression),
            });
        }
        Ok(Box::new(ZipEncoder {
            writer: ZipWriter::new(BufWriter::new(file)),
            level: options.level,
        }))
    }

    fn decoder(&self, file: File, compression: Compression) -> Result<Box<dyn EntryDecoder>> {
        if compression.is_compressed() {
            return Err(ArchiveError::UnsupportedFormat {
                reason: format!("zip cannot be wrapped in {compression}"),
            });
        }
        let archive = ZipArchive::new(BufReader::new(file)).map_err(ArchiveError::corrupt)?;
        Ok(Box::new(ZipDecoder { archive }))
    }
}

struct ZipEncoder {
    writer: ZipWriter<BufWriter<File>>,
    level: Option<u8>,
}

impl ZipEncoder {
    fn options(&self, member: &ArchiveMember) -> SimpleFileOptions {
        let base = SimpleFileOptions::default()
            .unix_permissions(member.mode & 0o7777)
            .last_modified_time(to_zip_time(member.mtime))
            .large_file(member.size >= ZIP64_THRESHOLD);

        match self.level {
            Some(0) => base.compression_method(CompressionMethod::Stored),
            Some(level) => base
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level.min(9)))),
            None => base.compression_method(CompressionMethod::Deflated),
        }
    }
}

impl EntryEncoder for ZipEncoder {
    fn append(&mut self, member: &ArchiveMember, payload: Option<&mut dyn Read>) -> io::Result<()> {
        let options = self.options(member);
        match member.kind {
            EntryKind::Directory => {
                let name = if member.name.ends_with('/') {
                    member.name.clone()
                } else {
                    format!("{}/", member.name)
                };
                self.writer
                    .add_directory(name, options.compression_method(CompressionMethod::Stored))
                    .map_err(io::Error::other)
            }
            EntryKind::File => {
                let reader = payload.ok_or_else(|| {
                    io::Error::other(format!("no payload for {}", member.name))
                })?;
                self.writer
                    .start_file(member.name.as_str(), options)
                    .map_err(io::Error::other)?;
                io::copy(reader, &mut self.writer)?;
                Ok(())
            }
            EntryKind::Symlink => {
                let target = member.link_target.as_deref().ok_or_else(|| {
                    io::Error::other(format!("no link target for {}", member.name))
                })?;
                self.writer
                    .add_symlink(member.name.as_str(), target, options)
                    .map_err(io::Error::other)
            }
            EntryKind::Hardlink | EntryKind::Other(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("zip cannot store {} {}", member.kind, member.name),
            )),
        }
    }

    fn finish(self: Box<Self>) -> io::Result<File> {
        let buffered = self.writer.finish().map_err(io::Error::other)?;
        let file = buffered.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(file)
    }
}

struct ZipDecoder {
    archive: ZipArchive<BufReader<File>>,
}

impl EntryDecoder for ZipDecoder {
    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(ArchiveError::corrupt)?;

            let unix_mode = file.unix_mode();
            let kind = if file.is_dir() {
                EntryKind::Directory
            } else if unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };

            let mut entry = ArchiveEntry::new(file.name(), kind, file.size());
            entry.mode = unix_mode.unwrap_or(0);
            entry.mtime = file.last_modified().map_or(0, from_zip_time);
            entry.compressed_size = Some(file.compressed_size());
            entry.crc32 = Some(file.crc32());
            entry.method = Some(match file.compression() {
                CompressionMethod::Stored => StorageMethod::Stored,
                CompressionMethod::Deflated => StorageMethod::Deflated,
                _ => StorageMethod::Other,
            });

            if kind == EntryKind::Symlink {
                let mut target = String::new();
                (&mut file)
                    .take(MAX_LINK_TARGET)
                    .read_to_string(&mut target)
                    .map_err(ArchiveError::corrupt)?;
                entry.link_target = Some(target);
                entry.size = 0;
                visitor(&entry, &mut io::empty())?;
            } else {
                visitor(&entry, &mut file)?;
            }
        }
        Ok(())
    }
}

/// Converts Unix seconds to a zip timestamp; zip cannot represent dates
/// before 1980, which fall back to 1980-01-01.
fn to_zip_time(mtime: u64) -> zip::DateTime {
    i64::try_from(mtime)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .and_then(|t| {
            zip::DateTime::from_date_and_time(
                u16::try_from(t.year()).ok()?,
                u8::try_from(t.month()).ok()?,
                u8::try_from(t.day()).ok()?,
                u8::try_from(t.hour()).ok()?,
                u8::try_from(t.minute()).ok()?,
                u8::try_from(t.second()).ok()?,
            )
            .ok()
        })
        .unwrap_or_default()
}

fn from_zip_time(time: zip::DateTime) -> u64 {
    chrono::NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(time.hour()),
            u32::from(time.minute()),
            u32::from(time.second()),
        )
    })
    .and_then(|t| u64::try_from(t.and_utc().timestamp()).ok())
    .unwrap_or(0)
}

//! POSIX/GNU tar container.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;

use tar::EntryType as TarEntryType;
use tar::Header;

use super::Compression;
use super::ContainerFormat;
use super::EncoderOptions;
use super::EntryDecoder;
use super::EntryEncoder;
use super::EntryVisitor;
use super::compression::CompressedWriter;
use super::compression::decompressing_reader;
use crate::ArchiveError;
use crate::Result;
use crate::types::ArchiveEntry;
use crate::types::ArchiveMember;
use crate::types::EntryKind;

/// Sequential tar container, optionally wrapped in a compression filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarFormat;

impl ContainerFormat for TarFormat {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn supports_compression(&self) -> bool {
        true
    }

    fn supports_hardlinks(&self) -> bool {
        true
    }

    fn encoder(&self, file: File, options: EncoderOptions) -> Result<Box<dyn EntryEncoder>> {
        let sink = CompressedWriter::new(BufWriter::new(file), options.compression, options.level)?;
        let mut builder = tar::Builder::new(sink);
        builder.follow_symlinks(false);
        Ok(Box::new(TarEncoder { builder }))
    }

    fn decoder(&self, file: File, compression: Compression) -> Result<Box<dyn EntryDecoder>> {
        let source = decompressing_reader(BufReader::new(file), compression)?;
        Ok(Box::new(TarDecoder {
            archive: tar::Archive::new(source),
        }))
    }
}

struct TarEncoder {
    builder: tar::Builder<CompressedWriter<BufWriter<File>>>,
}

impl EntryEncoder for TarEncoder {
    fn append(&mut self, member: &ArchiveMember, payload: Option<&mut dyn Read>) -> io::Result<()> {
        let mut header = Header::new_gnu();
        header.set_mode(member.mode & 0o7777);
        header.set_mtime(member.mtime);
        header.set_uid(member.uid);
        header.set_gid(member.gid);
        header.set_size(0);

        match member.kind {
            EntryKind::File => {
                let reader = payload.ok_or_else(|| {
                    io::Error::other(format!("no payload for {}", member.name))
                })?;
                header.set_entry_type(TarEntryType::Regular);
                header.set_size(member.size);
                self.builder.append_data(&mut header, &member.name, reader)
            }
            EntryKind::Directory => {
                header.set_entry_type(TarEntryType::Directory);
                self.builder
                    .append_data(&mut header, &member.name, io::empty())
            }
            EntryKind::Symlink | EntryKind::Hardlink => {
                let target = member.link_target.as_deref().ok_or_else(|| {
                    io::Error::other(format!("no link target for {}", member.name))
                })?;
                header.set_entry_type(if member.kind == EntryKind::Symlink {
                    TarEntryType::Symlink
                } else {
                    TarEntryType::Link
                });
                self.builder.append_link(&mut header, &member.name, target)
            }
            EntryKind::Other(flag) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot archive {} of {}", EntryKind::Other(flag), member.name),
            )),
        }
    }

    fn finish(self: Box<Self>) -> io::Result<File> {
        let compressed = self.builder.into_inner()?;
        let buffered = compressed.finish()?;
        let file = buffered.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(file)
    }
}

struct TarDecoder {
    archive: tar::Archive<Box<dyn Read>>,
}

impl EntryDecoder for TarDecoder {
    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        let entries = self.archive.entries().map_err(ArchiveError::corrupt)?;
        for entry in entries {
            let mut entry = entry.map_err(ArchiveError::corrupt)?;
            let decoded = decode_entry(&entry)?;
            visitor(&decoded, &mut entry)?;
        }
        Ok(())
    }
}

fn decode_entry<R: Read>(entry: &tar::Entry<'_, R>) -> Result<ArchiveEntry> {
    let header = entry.header();
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let size = entry.size();

    let kind = match header.entry_type() {
        TarEntryType::Regular | TarEntryType::Continuous if name.ends_with('/') => {
            EntryKind::Directory
        }
        TarEntryType::Regular | TarEntryType::Continuous => EntryKind::File,
        TarEntryType::Directory => EntryKind::Directory,
        TarEntryType::Symlink => EntryKind::Symlink,
        TarEntryType::Link => EntryKind::Hardlink,
        other => EntryKind::Other(other.as_byte()),
    };

    let link_target = entry
        .link_name_bytes()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .filter(|_| kind.is_link());

    let mut decoded = ArchiveEntry::new(name, kind, if kind.is_file() { size } else { 0 });
    decoded.mode = header.mode().map_err(ArchiveError::corrupt)?;
    decoded.mtime = header.mtime().map_err(ArchiveError::corrupt)?;
    decoded.uid = header.uid().ok();
    decoded.gid = header.gid().ok();
    decoded.link_target = link_target;
    Ok(decoded)
}

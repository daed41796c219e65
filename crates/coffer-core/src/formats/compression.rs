//! Streaming compression filters wrapped around the tar container.
//!
//! User levels follow a 1-9 scale (6 is the default) and are mapped onto
//! each codec's native range.

use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Outer compression filter for a sequential container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// No filter.
    #[default]
    None,
    /// gzip (`.gz`).
    Gzip,
    /// bzip2 (`.bz2`).
    Bzip2,
    /// xz (`.xz`).
    Xz,
    /// Zstandard (`.zst`).
    Zstd,
}

impl Compression {
    /// Short codec name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Returns `true` unless this is [`Compression::None`].
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a user level to a flate2 level.
#[must_use]
pub fn level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(n) => flate2::Compression::new(u32::from(n.clamp(1, 9))),
    }
}

/// Maps a user level to a bzip2 level.
#[must_use]
pub fn level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(n) => bzip2::Compression::new(u32::from(n.clamp(1, 9))),
    }
}

/// Maps a user level to an xz preset.
#[must_use]
pub fn level_to_xz(level: Option<u8>) -> u32 {
    level.map_or(6, |n| u32::from(n.clamp(1, 9)))
}

/// Maps a user level onto zstd's 1-22 range.
///
/// ```
/// use coffer_core::formats::compression::level_to_zstd;
///
/// assert_eq!(level_to_zstd(None), 3);
/// assert_eq!(level_to_zstd(Some(9)), 19);
/// ```
#[must_use]
pub fn level_to_zstd(level: Option<u8>) -> i32 {
    match level {
        None | Some(6) => 3,
        Some(0 | 1) => 1,
        Some(2) => 2,
        Some(3..=5) => 3,
        Some(7) => 10,
        Some(8) => 15,
        Some(_) => 19,
    }
}

/// A byte sink optionally wrapped in a compressing encoder.
///
/// [`CompressedWriter::finish`] must be called to write the codec trailer;
/// dropping the writer without it leaves a truncated stream.
pub enum CompressedWriter<W: Write> {
    /// Pass-through.
    Plain(W),
    /// gzip encoder.
    Gzip(GzEncoder<W>),
    /// bzip2 encoder.
    Bzip2(BzEncoder<W>),
    /// xz encoder.
    Xz(XzEncoder<W>),
    /// zstd encoder.
    Zstd(zstd::stream::write::Encoder<'static, W>),
}

impl<W: Write> CompressedWriter<W> {
    /// Wraps `inner` in the encoder for `compression`.
    pub fn new(inner: W, compression: Compression, level: Option<u8>) -> io::Result<Self> {
        Ok(match compression {
            Compression::None => Self::Plain(inner),
            Compression::Gzip => Self::Gzip(GzEncoder::new(inner, level_to_flate2(level))),
            Compression::Bzip2 => Self::Bzip2(BzEncoder::new(inner, level_to_bzip2(level))),
            Compression::Xz => Self::Xz(XzEncoder::new(inner, level_to_xz(level))),
            Compression::Zstd => Self::Zstd(zstd::stream::write::Encoder::new(
                inner,
                level_to_zstd(level),
            )?),
        })
    }

    /// Writes the codec trailer and returns the inner sink.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(w) => Ok(w),
            Self::Gzip(enc) => enc.finish(),
            Self::Bzip2(enc) => enc.finish(),
            Self::Xz(enc) => enc.finish(),
            Self::Zstd(enc) => enc.finish(),
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(enc) => enc.write(buf),
            Self::Bzip2(enc) => enc.write(buf),
            Self::Xz(enc) => enc.write(buf),
            Self::Zstd(enc) => enc.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(enc) => enc.flush(),
            Self::Bzip2(enc) => enc.flush(),
            Self::Xz(enc) => enc.flush(),
            Self::Zstd(enc) => enc.flush(),
        }
    }
}

/// Wraps `reader` in the decoder for `compression`.
///
/// Multi-member gzip, bzip2 and xz streams are read to the end.
pub fn decompressing_reader<'a, R: Read + 'a>(
    reader: R,
    compression: Compression,
) -> io::Result<Box<dyn Read + 'a>> {
    Ok(match compression {
        Compression::None => Box::new(reader),
        Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
        Compression::Bzip2 => Box::new(MultiBzDecoder::new(reader)),
        Compression::Xz => Box::new(XzDecoder::new_multi_decoder(reader)),
        Compression::Zstd => Box::new(zstd::stream::read::Decoder::with_buffer(BufReader::new(
            reader,
        ))?),
    })
}

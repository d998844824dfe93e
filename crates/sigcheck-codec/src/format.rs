use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use crate::error::{CodecError, Result};

/// Compression codec applied to every file of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Conventional file suffix, including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
            Self::Xz => ".xz",
            Self::Zstd => ".zst",
        }
    }

    /// Codec implied by a file name or bare suffix. Unknown suffixes mean no compression.
    pub fn from_suffix(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        [Self::Gzip, Self::Bzip2, Self::Xz, Self::Zstd]
            .into_iter()
            .find(|codec| lower.ends_with(codec.suffix()))
            .unwrap_or(Self::None)
    }

    /// Codec identified by the leading magic bytes of a stream, if any.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [0x1F, 0x8B, ..] => Some(Self::Gzip),
            [b'B', b'Z', b'h', b'1'..=b'9', ..] => Some(Self::Bzip2),
            [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(Self::Xz),
            [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(Self::Zstd),
            _ => None,
        }
    }

    pub fn is_supported(self) -> bool {
        match self {
            Self::None => true,
            Self::Gzip => cfg!(feature = "gzip"),
            Self::Bzip2 => cfg!(feature = "bzip2"),
            Self::Xz => cfg!(feature = "xz"),
            Self::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// Wrap `reader` in a decoder for this codec.
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>> {
        match self {
            Self::None => Ok(Decoder::Passthrough(reader)),
            #[cfg(feature = "gzip")]
            Self::Gzip => Ok(Decoder::Gzip(Box::new(flate2::read::MultiGzDecoder::new(
                Source::new(reader),
            )))),
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => Ok(Decoder::Bzip2(Box::new(bzip2::read::MultiBzDecoder::new(
                Source::new(reader),
            )))),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Decoder::Xz(Box::new(
                xz2::read::XzDecoder::new_multi_decoder(Source::new(reader)),
            ))),
            #[cfg(feature = "zstd")]
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(Source::new(reader))?;
                Ok(Decoder::Zstd(Box::new(decoder)))
            }
            #[allow(unreachable_patterns)]
            other => Err(CodecError::Unsupported(other)),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Compression {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "raw" => Ok(Self::None),
            "gzip" | "gz" => Ok(Self::Gzip),
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            "xz" => Ok(Self::Xz),
            "zstd" | "zst" => Ok(Self::Zstd),
            _ => Err(CodecError::UnknownCodec(s.to_string())),
        }
    }
}

/// Raw byte source that remembers whether it failed, so decoder errors can
/// be told apart from I/O errors of the underlying file.
#[derive(Debug)]
pub struct Source<R> {
    inner:  R,
    failed: bool,
}

impl<R> Source<R> {
    fn new(inner: R) -> Self { Self { inner, failed: false } }
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|err| {
            if err.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}

/// Decompressing reader for one file.
pub enum Decoder<R> {
    Passthrough(R),
    #[cfg(feature = "gzip")]
    Gzip(Box<flate2::read::MultiGzDecoder<Source<R>>>),
    #[cfg(feature = "bzip2")]
    Bzip2(Box<bzip2::read::MultiBzDecoder<Source<R>>>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::read::XzDecoder<Source<R>>>),
    #[cfg(feature = "zstd")]
    Zstd(Box<zstd::stream::read::Decoder<'static, io::BufReader<Source<R>>>>),
}

impl<R> Decoder<R> {
    pub fn compression(&self) -> Compression {
        match self {
            Self::Passthrough(_) => Compression::None,
            #[cfg(feature = "gzip")]
            Self::Gzip(_) => Compression::Gzip,
            #[cfg(feature = "bzip2")]
            Self::Bzip2(_) => Compression::Bzip2,
            #[cfg(feature = "xz")]
            Self::Xz(_) => Compression::Xz,
            #[cfg(feature = "zstd")]
            Self::Zstd(_) => Compression::Zstd,
        }
    }

    fn source_failed(&self) -> bool {
        match self {
            Self::Passthrough(_) => true,
            #[cfg(feature = "gzip")]
            Self::Gzip(d) => d.get_ref().failed,
            #[cfg(feature = "bzip2")]
            Self::Bzip2(d) => d.get_ref().failed,
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.get_ref().failed,
            #[cfg(feature = "zstd")]
            Self::Zstd(d) => d.get_ref().get_ref().failed,
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = match self {
            Self::Passthrough(r) => r.read(buf),
            #[cfg(feature = "gzip")]
            Self::Gzip(d) => d.read(buf),
            #[cfg(feature = "bzip2")]
            Self::Bzip2(d) => d.read(buf),
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.read(buf),
            #[cfg(feature = "zstd")]
            Self::Zstd(d) => d.read(buf),
        };

        result.map_err(|err| {
            if err.kind() == io::ErrorKind::Interrupted || self.source_failed() {
                err
            } else {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    CodecError::Corrupt {
                        codec:  self.compression(),
                        source: err,
                    },
                )
            }
        })
    }
}

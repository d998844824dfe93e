//! Streaming decompression for checked files.
//!
//! A batch is stored under one [`Compression`] scheme; [`Compression::decoder`]
//! wraps a raw byte source so consumers only ever see decompressed bytes.
//!
//! Corrupt compressed data is reported as an `io::Error` of kind
//! `InvalidData` carrying a [`CodecError::Corrupt`]; failures of the wrapped
//! reader pass through untouched. Use [`CodecError::from_io`] to tell them apart.

pub use error::{CodecError, Result};
pub use format::{Compression, Decoder};

mod error;
mod format;

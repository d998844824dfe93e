use std::io;

use crate::Compression;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{0} support is not compiled in")]
    Unsupported(Compression),

    #[error("unknown compression '{0}'")]
    UnknownCodec(String),

    #[error("corrupt {codec} stream: {source}")]
    Corrupt {
        codec:  Compression,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Recover a codec error carried inside an `io::Error` returned by [`crate::Decoder`].
    pub fn from_io(err: &io::Error) -> Option<&CodecError> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<CodecError>())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

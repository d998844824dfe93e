use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("unknown digest algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("digest algorithm '{0}' is not compiled in")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerificationError>;

use std::io;
use std::path::{Path, PathBuf};

use sigcheck_codec::CodecError;
use sigcheck_verify::VerificationError;

/// Fatal manifest problems. Any of these aborts the run before work starts.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to open manifest '{path}': {source}")]
    Open {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read manifest: {0}")]
    Read(#[source] io::Error),

    #[error("malformed manifest line {line_number}: {line:?}")]
    MalformedLine { line_number: usize, line: String },

    #[error("duplicate manifest entry '{name}' on line {line_number}")]
    DuplicateEntry { name: String, line_number: usize },
}

/// Per-file failures. These are carried inside a [`crate::FileResult`] and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decompress '{path}': {source}")]
    Decompression {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed reading '{path}': {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot verify digest: {0}")]
    Digest(#[source] VerificationError),

    #[error("skipped after an earlier failure")]
    Skipped,
}

impl CheckError {
    /// Classify an error raised while streaming `path` through a decoder.
    pub fn from_stream(path: &Path, err: io::Error) -> Self {
        if CodecError::from_io(&err).is_some() {
            Self::Decompression { path: path.to_path_buf(), source: err }
        } else {
            Self::Read { path: path.to_path_buf(), source: err }
        }
    }

    pub fn from_codec(path: &Path, err: CodecError) -> Self {
        Self::Decompression { path: path.to_path_buf(), source: io::Error::other(err) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("concurrency limit must be at least 1")]
    InvalidJobs,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, BatchError>;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use sigcheck_codec::{Compression, Decoder};
use tracing::warn;

use crate::data::WorkItem;
use crate::error::CheckError;

/// Turns a [`WorkItem`] into the byte stream that gets hashed.
///
/// Called from a blocking worker thread, once per item.
pub trait StreamSource: Send + Sync {
    type Reader: Read;

    fn open(&self, item: &WorkItem) -> Result<Self::Reader, CheckError>;
}

/// Reads files from disk through the batch's decompression codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileSource {
    compression: Compression,
}

impl FileSource {
    pub fn new(compression: Compression) -> Self { Self { compression } }
}

impl StreamSource for FileSource {
    type Reader = Decoder<BufReader<File>>;

    fn open(&self, item: &WorkItem) -> Result<Self::Reader, CheckError> {
        let file = File::open(&item.path).map_err(|source| CheckError::Open {
            path: item.path.clone(),
            source,
        })?;

        let mut reader = BufReader::new(file);
        // Peeking only fills the buffer; a failure here is left to the first read.
        if let Ok(header) = reader.fill_buf() {
            if let Some(detected) = foreign_codec(self.compression, header) {
                warn!(
                    file = %item.name,
                    configured = %self.compression,
                    %detected,
                    "file content does not match the configured compression"
                );
            }
        }

        self.compression
            .decoder(reader)
            .map_err(|err| CheckError::from_codec(&item.path, err))
    }
}

/// Codec `header` belongs to, when it differs from a configured compressed codec.
/// Uncompressed batches are hashed as raw bytes whatever they contain.
fn foreign_codec(configured: Compression, header: &[u8]) -> Option<Compression> {
    if configured == Compression::None {
        return None;
    }
    Compression::detect(header).filter(|detected| *detected != configured)
}

//! File signature worker: stream one file through a hasher and compare.

use std::io::{ErrorKind, Read};

use sigcheck_verify::{HasherFactory, HashingReader};
use tracing::trace;

use crate::data::{FileResult, WorkItem};
use crate::error::CheckError;
use crate::source::StreamSource;

/// Verify a single item. Always produces a result; failures are captured in it.
pub fn check<S, F>(item: WorkItem, source: &S, hashers: &F, buffer_size: usize) -> FileResult
where
    S: StreamSource + ?Sized,
    F: HasherFactory + ?Sized,
{
    match digest(&item, source, hashers, buffer_size) {
        Ok(verdict) => FileResult::verified(item, verdict),
        Err(err) => FileResult::failed(item, err),
    }
}

/// Stream the item to its end. The inner result is the digest verdict.
fn digest<S, F>(
    item: &WorkItem,
    source: &S,
    hashers: &F,
    buffer_size: usize,
) -> Result<sigcheck_verify::Result<String>, CheckError>
where
    S: StreamSource + ?Sized,
    F: HasherFactory + ?Sized,
{
    let stream = source.open(item)?;
    let mut reader = HashingReader::new(stream, hashers.new_hasher());
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(CheckError::from_stream(&item.path, err)),
        }
    }

    trace!(file = %item.name, bytes = reader.bytes_read(), "hashed");
    Ok(reader.finish(&item.expected))
}

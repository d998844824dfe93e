use std::io::{self, Read};

use crate::{Hasher, Result, VerificationError};

/// Streaming reader that hashes data as it passes through.
/// Wraps any `Read` source; the data is never buffered beyond the caller's buffer.
pub struct HashingReader<R, H> {
    reader: R,
    hasher: H,
    bytes:  u64,
}

impl<R, H> HashingReader<R, H> {
    /// Create a new hashing reader.
    pub fn new(reader: R, hasher: H) -> Self {
        Self { reader, hasher, bytes: 0 }
    }

    /// Number of bytes hashed so far.
    pub fn bytes_read(&self) -> u64 { self.bytes }
}

impl<R: Read, H: Hasher> Read for HashingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes += n as u64;
        }
        Ok(n)
    }
}

impl<R, H: Hasher> HashingReader<R, H> {
    /// Consume the reader and return the raw digest.
    pub fn finalize(self) -> Vec<u8> { self.hasher.finalize() }

    /// Consume the reader and return the lower-case hex digest.
    pub fn finalize_hex(self) -> String { hex::encode(self.finalize()) }

    /// Finalize against an expected hex digest and return the actual one.
    /// Comparison is exact.
    pub fn finish(self, expected: &str) -> Result<String> {
        let actual = self.finalize_hex();
        if actual == expected {
            Ok(actual)
        } else {
            Err(VerificationError::Mismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}

#[cfg(all(test, feature = "sha256"))]
mod tests {
    use super::*;
    use crate::Sha256Hasher;
    use std::io::Cursor;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_hashing_reader_success() {
        let mut reader = HashingReader::new(Cursor::new(b"hello world"), Sha256Hasher::new());
        io::copy(&mut reader, &mut io::sink()).unwrap();

        assert_eq!(reader.bytes_read(), 11);
        assert_eq!(reader.finish(HELLO_WORLD).unwrap(), HELLO_WORLD);
    }

    #[test]
    fn test_hashing_reader_small_buffer() {
        let data = vec![7u8; 10_000];
        let mut reader = HashingReader::new(Cursor::new(&data), Sha256Hasher::new());

        let mut buffer = [0u8; 3];
        while reader.read(&mut buffer).unwrap() > 0 {}

        assert_eq!(reader.finalize(), Sha256Hasher::digest(&data));
    }

    #[test]
    fn test_hashing_reader_mismatch() {
        let mut reader = HashingReader::new(Cursor::new(b"test data"), Sha256Hasher::new());
        io::copy(&mut reader, &mut io::sink()).unwrap();

        match reader.finish(&"0".repeat(64)) {
            Err(VerificationError::Mismatch { expected, actual }) => {
                assert_eq!(expected, "0".repeat(64));
                assert_ne!(actual, expected);
            }
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let mut reader = HashingReader::new(Cursor::new(b"hello world"), Sha256Hasher::new());
        io::copy(&mut reader, &mut io::sink()).unwrap();

        assert!(reader.finish(&HELLO_WORLD.to_uppercase()).is_err());
    }
}

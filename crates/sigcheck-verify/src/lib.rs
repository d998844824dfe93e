//! Streaming digest primitives for file integrity checks.
//!
//! Hashes data incrementally as it is read, so a file of any size can be
//! fingerprinted with a fixed-size buffer. Algorithms are pluggable through
//! the minimal [`Hasher`] trait; [`DigestAlgorithm`] covers the built-in ones.
//!
//! # Example
//!
//! ```
//! use sigcheck_verify::{DigestAlgorithm, HashingReader};
//!
//! let data = b"hello world";
//! let mut reader = HashingReader::new(&data[..], DigestAlgorithm::Sha256.hasher());
//! std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
//!
//! assert_eq!(
//!     reader.finalize_hex(),
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//! ```

pub use self::algorithm::{AnyHasher, DigestAlgorithm};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{DigestHasher, Hasher, HasherFactory};
pub use self::reader::HashingReader;

#[cfg(feature = "sha256")]
pub use self::hasher::{Sha256Hasher, Sha512Hasher};

#[cfg(feature = "sha1")]
pub use self::hasher::Sha1Hasher;

#[cfg(feature = "blake3")]
pub use self::hasher::Blake3Hasher;

mod algorithm;
mod error;
mod hasher;
mod reader;

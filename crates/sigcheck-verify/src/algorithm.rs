use std::fmt;
use std::str::FromStr;

use crate::{Hasher, HasherFactory, VerificationError};

#[cfg(feature = "sha256")]
use crate::{Sha256Hasher, Sha512Hasher};

#[cfg(feature = "sha1")]
use crate::Sha1Hasher;

#[cfg(feature = "blake3")]
use crate::Blake3Hasher;

/// Built-in digest algorithms.
///
/// Names accepted by [`FromStr`] match the `*sum` tool families:
/// `sha256`, `sha512`, `sha1`, `blake3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[cfg(feature = "sha256")]
    Sha256,
    #[cfg(feature = "sha256")]
    Sha512,
    #[cfg(feature = "sha1")]
    Sha1,
    #[cfg(feature = "blake3")]
    Blake3,
}

#[cfg(feature = "sha256")]
impl Default for DigestAlgorithm {
    fn default() -> Self { Self::Sha256 }
}

impl DigestAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "sha256")]
            Self::Sha256 => "sha256",
            #[cfg(feature = "sha256")]
            Self::Sha512 => "sha512",
            #[cfg(feature = "sha1")]
            Self::Sha1 => "sha1",
            #[cfg(feature = "blake3")]
            Self::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes. The hex form is twice as long.
    pub fn output_len(self) -> usize {
        match self {
            #[cfg(feature = "sha256")]
            Self::Sha256 => 32,
            #[cfg(feature = "sha256")]
            Self::Sha512 => 64,
            #[cfg(feature = "sha1")]
            Self::Sha1 => 20,
            #[cfg(feature = "blake3")]
            Self::Blake3 => 32,
        }
    }

    pub fn hasher(self) -> AnyHasher {
        match self {
            #[cfg(feature = "sha256")]
            Self::Sha256 => AnyHasher::Sha256(Sha256Hasher::new()),
            #[cfg(feature = "sha256")]
            Self::Sha512 => AnyHasher::Sha512(Sha512Hasher::new()),
            #[cfg(feature = "sha1")]
            Self::Sha1 => AnyHasher::Sha1(Sha1Hasher::new()),
            #[cfg(feature = "blake3")]
            Self::Blake3 => AnyHasher::Blake3(Blake3Hasher::new()),
        }
    }

    /// One-shot lower-case hex digest of an in-memory buffer.
    pub fn digest_hex(self, data: &[u8]) -> String {
        let mut hasher = self.hasher();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }
}

impl HasherFactory for DigestAlgorithm {
    type Hasher = AnyHasher;

    fn new_hasher(&self) -> AnyHasher { self.hasher() }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for DigestAlgorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            #[cfg(feature = "sha256")]
            "sha256" | "sha-256" => Ok(Self::Sha256),
            #[cfg(not(feature = "sha256"))]
            "sha256" | "sha-256" => Err(VerificationError::Unsupported("sha256")),
            #[cfg(feature = "sha256")]
            "sha512" | "sha-512" => Ok(Self::Sha512),
            #[cfg(not(feature = "sha256"))]
            "sha512" | "sha-512" => Err(VerificationError::Unsupported("sha512")),
            #[cfg(feature = "sha1")]
            "sha1" | "sha-1" => Ok(Self::Sha1),
            #[cfg(not(feature = "sha1"))]
            "sha1" | "sha-1" => Err(VerificationError::Unsupported("sha1")),
            #[cfg(feature = "blake3")]
            "blake3" => Ok(Self::Blake3),
            #[cfg(not(feature = "blake3"))]
            "blake3" => Err(VerificationError::Unsupported("blake3")),
            _ => Err(VerificationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Enum dispatch over the built-in hashers.
pub enum AnyHasher {
    #[cfg(feature = "sha256")]
    Sha256(Sha256Hasher),
    #[cfg(feature = "sha256")]
    Sha512(Sha512Hasher),
    #[cfg(feature = "sha1")]
    Sha1(Sha1Hasher),
    #[cfg(feature = "blake3")]
    Blake3(Blake3Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            #[cfg(feature = "sha256")]
            Self::Sha256(h) => h.update(data),
            #[cfg(feature = "sha256")]
            Self::Sha512(h) => h.update(data),
            #[cfg(feature = "sha1")]
            Self::Sha1(h) => h.update(data),
            #[cfg(feature = "blake3")]
            Self::Blake3(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            #[cfg(feature = "sha256")]
            Self::Sha256(h) => h.finalize(),
            #[cfg(feature = "sha256")]
            Self::Sha512(h) => h.finalize(),
            #[cfg(feature = "sha1")]
            Self::Sha1(h) => h.finalize(),
            #[cfg(feature = "blake3")]
            Self::Blake3(h) => h.finalize(),
        }
    }
}

#[cfg(all(test, feature = "sha256", feature = "sha1", feature = "blake3"))]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("sha256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("SHA-1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!("blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert!(matches!(
            "md5".parse::<DigestAlgorithm>(),
            Err(VerificationError::UnknownAlgorithm(name)) if name == "md5"
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for algorithm in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha512,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Blake3,
        ] {
            assert_eq!(algorithm.to_string().parse::<DigestAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn hex_length_matches_output_len() {
        for algorithm in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha512,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Blake3,
        ] {
            assert_eq!(algorithm.digest_hex(b"x").len(), algorithm.output_len() * 2);
        }
    }

    #[test]
    fn sha512_empty_input() {
        assert_eq!(
            DigestAlgorithm::Sha512.digest_hex(b""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }
}

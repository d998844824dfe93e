use digest::Digest;

/// Incremental hash state fed by a byte stream.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Produces a fresh [`Hasher`] for every file in a batch.
pub trait HasherFactory: Send + Sync {
    type Hasher: Hasher;

    fn new_hasher(&self) -> Self::Hasher;
}

impl<F, H> HasherFactory for F
where
    F: Fn() -> H + Send + Sync,
    H: Hasher,
{
    type Hasher = H;

    fn new_hasher(&self) -> H { self() }
}

/// Adapter over any RustCrypto [`Digest`] implementation.
pub struct DigestHasher<D>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

#[cfg(feature = "sha256")]
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

#[cfg(feature = "sha256")]
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(feature = "sha1")]
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;

#[cfg(feature = "blake3")]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }
}

#[cfg(feature = "blake3")]
impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { blake3::hash(data).as_bytes().to_vec() }
}

#[cfg(feature = "blake3")]
impl Default for Blake3Hasher {
    fn default() -> Self { Self::new() }
}

//! Pluggable checksum algorithms.
//!
//! The writer never names a hash function directly; it asks a [`ChecksumAlgorithm`] for a
//! fresh [`Hasher`] per write (streaming) and per verification (re-read from disk).
use sha2::{Digest, Sha256, Sha512};

/// Running digest state for one pass over the bytes.
pub trait Hasher: Send {
    fn update(&mut self, bytes: &[u8]);
    /// Consume the state and return the lowercase hex digest.
    fn finalize_hex(self: Box<Self>) -> String;
}

pub trait ChecksumAlgorithm: Send + Sync {
    /// Short label recorded in emitted facts, e.g. `sha256`.
    fn name(&self) -> &'static str;
    fn hasher(&self) -> Box<dyn Hasher>;
}

struct DigestHasher<D>(D);

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        hex::encode(self.0.finalize())
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Sha256Checksum;

impl ChecksumAlgorithm for Sha256Checksum {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(DigestHasher(Sha256::new()))
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Sha512Checksum;

impl ChecksumAlgorithm for Sha512Checksum {
    fn name(&self) -> &'static str {
        "sha512"
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(DigestHasher(Sha512::new()))
    }
}

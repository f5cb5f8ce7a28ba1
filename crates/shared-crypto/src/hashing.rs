//! # BLAKE3 Hashing
//!
//! Content addressing for ledger objects. Every hash is taken under a domain
//! tag so a bundle id can never equal, say, a derived key seed.

use blake3::Hasher;

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    /// Create a hasher bound to a domain tag.
    pub fn with_domain(domain: &str) -> Self {
        Self {
            inner: Hasher::new_derive_key(domain),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(&self) -> Hash {
        *self.inner.finalize().as_bytes()
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with BLAKE3 (one-shot, no domain).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Content hash of `data` under `domain`.
pub fn content_hash(domain: &str, data: &[u8]) -> Hash {
    let mut hasher = Blake3Hasher::with_domain(domain);
    hasher.update(data);
    hasher.finalize()
}

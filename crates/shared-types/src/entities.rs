//! # Core Identity Entities
//!
//! Key material aliases and the `Party` identity used across the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash (BLAKE3).
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A well-known ledger identity: a legal name bound to its owning key.
///
/// Two parties are equal only if both the name and the key match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    /// Legal name, e.g. `O=Bank,L=London,C=GB` or simply `Bank`.
    pub name: String,
    /// Key that signs on behalf of this party.
    pub owning_key: PublicKey,
}

impl Party {
    /// Create a party from its name and owning key.
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }

    /// Short hex fingerprint of the owning key, for logs.
    pub fn key_fingerprint(&self) -> String {
        short_hex(&self.owning_key)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// First 8 bytes of a hash or key, hex encoded.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(8)])
}

//! # Shared Crypto - Ledger Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Content-addressed bundle ids, key derivation |
//! | `signatures` | Ed25519 | Party and notary signatures over bundle ids |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **BLAKE3**: Domain-separated hashing so ids of different kinds never collide
//! - **Zeroize**: Secret seeds are wiped when a key pair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{blake3_hash, content_hash, Blake3Hasher, Hash};
pub use signatures::{verify_signature, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

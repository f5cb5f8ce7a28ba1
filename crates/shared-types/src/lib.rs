//! # Shared Types Crate
//!
//! Identities, key/hash aliases and the `SessionEnvelope` wire envelope used
//! by every crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Party` is the only identity type; crates never
//!   invent their own notion of "who".
//! - **Envelope Authority**: the envelope's `sender` is authoritative; payloads
//!   never repeat the sender's identity.
//! - **Directory Lookups**: names resolve to parties (and notaries) through
//!   `PartyDirectory`, never through ad-hoc maps.

pub mod directory;
pub mod entities;
pub mod envelope;
pub mod errors;

pub use directory::PartyDirectory;
pub use entities::*;
pub use envelope::SessionEnvelope;
pub use errors::*;

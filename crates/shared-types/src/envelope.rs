//! # `SessionEnvelope`
//!
//! The wrapper for every message exchanged on a point-to-point session.
//!
//! ## Properties
//!
//! - **Versioning**: receivers reject envelopes with an unknown `version`.
//! - **Session binding**: `session_id` ties the envelope to one protocol run.
//! - **Ordering**: `sequence` increases by one per sender within a session.
//! - **Envelope Authority**: `sender` is the sole source of truth for identity.

use crate::errors::MessageError;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A message on a point-to-point session between two parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEnvelope {
    // =========================================================================
    // HEADER SECTION
    // =========================================================================
    /// Protocol version for forward compatibility.
    pub version: u16,

    /// Session this envelope belongs to.
    pub session_id: Uuid,

    /// Name of the sending party. Authoritative.
    pub sender: String,

    /// Name of the intended recipient.
    pub recipient: String,

    /// Per-sender sequence number within the session, starting at 0.
    pub sequence: u64,

    /// Unix timestamp (seconds) when the envelope was created.
    pub timestamp: u64,

    // =========================================================================
    // PAYLOAD SECTION
    // =========================================================================
    /// Encoded protocol message.
    pub payload: Vec<u8>,
}

impl SessionEnvelope {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Wrap a payload for the given session.
    pub fn new(
        session_id: Uuid,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        sequence: u64,
        payload: Vec<u8>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            version: Self::CURRENT_VERSION,
            session_id,
            sender: sender.into(),
            recipient: recipient.into(),
            sequence,
            timestamp,
            payload,
        }
    }

    /// Check version, sender and ordering against what the receiver expects.
    pub fn verify(&self, expected_sender: &str, expected_sequence: u64) -> Result<(), MessageError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(MessageError::UnsupportedVersion {
                received: self.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        if self.sender != expected_sender {
            return Err(MessageError::UnexpectedSender {
                expected: expected_sender.to_string(),
                actual: self.sender.clone(),
            });
        }
        if self.sequence != expected_sequence {
            return Err(MessageError::OutOfOrder {
                expected: expected_sequence,
                actual: self.sequence,
            });
        }
        Ok(())
    }
}

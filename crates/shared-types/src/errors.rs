//! # Error Types
//!
//! Errors shared by the session transport and its users.

use thiserror::Error;

/// Errors related to envelope verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Envelope version not supported.
    #[error("Unsupported version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u16, supported: u16 },

    /// Envelope came from someone other than the session counterparty.
    #[error("Unexpected sender: expected {expected}, got {actual}")]
    UnexpectedSender { expected: String, actual: String },

    /// Sequence number skipped or repeated.
    #[error("Out of order: expected sequence {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },
}

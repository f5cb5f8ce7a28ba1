//! Bus error types.

use shared_types::MessageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors from opening sessions or moving envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// No listener registered under this name.
    #[error("Unknown party: {name}")]
    UnknownParty { name: String },

    /// The party's listener was dropped.
    #[error("Party unreachable: {name}")]
    PartyUnreachable { name: String },

    /// The other end of the session went away.
    #[error("Session {session_id} closed")]
    ChannelClosed { session_id: Uuid },

    /// Envelope failed verification.
    #[error("Envelope rejected: {0}")]
    Envelope(#[from] MessageError),
}

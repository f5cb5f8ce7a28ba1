//! Session protocol messages.

use crate::error::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use shared_types::Hash;
use std::fmt;
use tr_01_record_contract::{FinalizedBundle, SignedBundle, TransactionSignature};

/// What the initiator expects from a counterparty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterpartyRole {
    /// Must validate and counter-sign, then receive finality.
    Signer,
    /// Only receives finality.
    Participant,
}

impl fmt::Display for CounterpartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterpartyRole::Signer => f.write_str("SIGNER"),
            CounterpartyRole::Participant => f.write_str("PARTICIPANT"),
        }
    }
}

/// Everything that travels over a flow session.
///
/// Initiator to responder: `Role`, `SignatureRequest`, `Finalized`, `Abort`.
/// Responder to initiator: `SignatureResponse`, `Rejection`, `StorageAck`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionMessage {
    Role(CounterpartyRole),
    SignatureRequest(SignedBundle),
    SignatureResponse(TransactionSignature),
    Rejection { reason: String },
    Finalized(FinalizedBundle),
    StorageAck { tx_id: Hash },
    Abort { reason: String },
}

impl SessionMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionMessage::Role(_) => "Role",
            SessionMessage::SignatureRequest(_) => "SignatureRequest",
            SessionMessage::SignatureResponse(_) => "SignatureResponse",
            SessionMessage::Rejection { .. } => "Rejection",
            SessionMessage::Finalized(_) => "Finalized",
            SessionMessage::StorageAck { .. } => "StorageAck",
            SessionMessage::Abort { .. } => "Abort",
        }
    }

    pub fn to_bytes(&self) -> FlowResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| FlowError::Codec {
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> FlowResult<Self> {
        bincode::deserialize(bytes).map_err(|e| FlowError::Codec {
            reason: e.to_string(),
        })
    }
}

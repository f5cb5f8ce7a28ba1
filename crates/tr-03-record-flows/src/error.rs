//! Error types for the record flows

use crate::config::ConfigError;
use shared_bus::BusError;
use thiserror::Error;
use tr_01_record_contract::{
    RecordError, StateRef, ValidationError, ValueConstraintError, ViolationCategory,
};
use tr_02_ledger_store::StoreError;

/// Caller-facing classification of a flow failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValueConstraint,
    ProposalShape,
    Authorization,
    CounterpartyRejection,
    ConsensusConflict,
    NetworkTimeout,
    /// Transport, storage, configuration and protocol-violation failures.
    Internal,
}

/// Flow errors
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    #[error("Value constraint violated: {0}")]
    ValueConstraint(#[from] ValueConstraintError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Value transfer could not be built: {reason}")]
    ValueTransfer { reason: String },

    #[error("No notary available (preferred: {preferred:?})")]
    NoNotary { preferred: Option<String> },

    #[error("Unknown party: {name}")]
    UnknownParty { name: String },

    #[error("Counterparty {party} rejected the proposal: {reason}")]
    CounterpartyRejection { party: String, reason: String },

    #[error("Invalid counter-signature from {party}: {reason}")]
    InvalidCounterSignature { party: String, reason: String },

    #[error("Missing {missing} required signature(s) after collection")]
    MissingSignatures { missing: usize },

    #[error("Consensus conflict on {} input(s)", .refs.len())]
    ConsensusConflict { refs: Vec<StateRef> },

    #[error("Consensus authority rejected the proposal: {reason}")]
    ConsensusRejected { reason: String },

    #[error("Timed out waiting for {waiting_for}")]
    Timeout { waiting_for: String },

    #[error("Flow aborted by {party}: {reason}")]
    Aborted { party: String, reason: String },

    #[error("Protocol violation by {party}: {detail}")]
    ProtocolViolation { party: String, detail: String },

    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Codec error: {reason}")]
    Codec { reason: String },

    #[error("Session error: {0}")]
    Session(#[from] BusError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Record error: {0}")]
    Record(RecordError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::ValueConstraint(_) | FlowError::ValueTransfer { .. } => {
                ErrorKind::ValueConstraint
            }
            FlowError::Validation(err) => match err.category() {
                ViolationCategory::ProposalShape => ErrorKind::ProposalShape,
                ViolationCategory::Authorization => ErrorKind::Authorization,
            },
            FlowError::InvalidCounterSignature { .. } | FlowError::MissingSignatures { .. } => {
                ErrorKind::Authorization
            }
            FlowError::CounterpartyRejection { .. } | FlowError::Aborted { .. } => {
                ErrorKind::CounterpartyRejection
            }
            FlowError::ConsensusConflict { .. } => ErrorKind::ConsensusConflict,
            FlowError::Timeout { .. } => ErrorKind::NetworkTimeout,
            FlowError::NoNotary { .. }
            | FlowError::UnknownParty { .. }
            | FlowError::ConsensusRejected { .. }
            | FlowError::ProtocolViolation { .. }
            | FlowError::InvalidTransition { .. }
            | FlowError::Codec { .. }
            | FlowError::Session(_)
            | FlowError::Store(_)
            | FlowError::Record(_)
            | FlowError::Config(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn timeout(waiting_for: impl Into<String>) -> Self {
        FlowError::Timeout {
            waiting_for: waiting_for.into(),
        }
    }

    pub(crate) fn violation(party: impl ToString, detail: impl Into<String>) -> Self {
        FlowError::ProtocolViolation {
            party: party.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<RecordError> for FlowError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::ValueConstraint(e) => FlowError::ValueConstraint(e),
            RecordError::Validation(e) => FlowError::Validation(e),
            other => FlowError::Record(other),
        }
    }
}

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

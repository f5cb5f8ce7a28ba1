//! Error types for the record contract

use thiserror::Error;

/// Record construction invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueConstraintError {
    #[error("Quantity cannot be a negative value {quantity}")]
    NegativeQuantity { quantity: i64 },

    #[error("From-holder {holder} and to-holder {holder} cannot be identical")]
    IdenticalHolders { holder: String },
}

/// Which family of rule a rejected bundle broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationCategory {
    /// Wrong command count, disallowed input or missing output.
    ProposalShape,
    /// A required signer is missing.
    Authorization,
}

/// Reasons `RecordValidator` rejects a bundle, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proposal shape error: exactly one create command required (found {found})")]
    CreateCommandCount { found: usize },

    #[error("proposal shape error: records cannot be consumed, {count} record input(s) found")]
    RecordInputs { count: usize },

    #[error("proposal shape error: no record output")]
    NoRecordOutput,

    #[error("authorization error: explorer must sign ({explorer} is not a required signer)")]
    ExplorerNotSigner { explorer: String },
}

impl ValidationError {
    pub fn category(&self) -> ViolationCategory {
        match self {
            ValidationError::CreateCommandCount { .. }
            | ValidationError::RecordInputs { .. }
            | ValidationError::NoRecordOutput => ViolationCategory::ProposalShape,
            ValidationError::ExplorerNotSigner { .. } => ViolationCategory::Authorization,
        }
    }
}

/// Contract crate errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Value constraint error: {0}")]
    ValueConstraint(#[from] ValueConstraintError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Unknown record type: {value}")]
    UnknownRecordType { value: String },

    #[error("Unknown party: {name}")]
    UnknownParty { name: String },

    #[error("Invalid signature by key {signer}")]
    InvalidSignature { signer: String },

    #[error("Missing {missing} required signature(s)")]
    MissingSignatures { missing: usize },

    #[error("Notary signature by {signer} does not match bundle notary {notary}")]
    WrongNotarySigner { signer: String, notary: String },
}

/// Result type for contract operations
pub type RecordResult<T> = Result<T, RecordError>;

//! Ledger store errors

use thiserror::Error;
use tr_01_record_contract::RecordError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The bundle failed signature or notary verification.
    #[error("Refusing to record transaction {tx_id}: {source}")]
    InvalidTransaction {
        tx_id: String,
        #[source]
        source: RecordError,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

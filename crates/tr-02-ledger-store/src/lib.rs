//! # tr-02-ledger-store
//!
//! The visible ledger of one party.
//!
//! Two views are kept:
//!
//! - **Transaction storage**: every finalized bundle this party received,
//!   whole, keyed by its content-addressed id. Recording is idempotent.
//! - **Vault**: only the states this party participates in (records belong to
//!   their explorer, tokens to their holder). Inputs of recorded bundles are
//!   marked consumed. Record queries run over the vault's record projections.
//!
//! Stores are append-only; the only mutation is `record_transaction`.
//!
//! ```rust,ignore
//! use tr_02_ledger_store::{InMemoryLedgerStore, LedgerStore, RecordQuery, SortDirection};
//!
//! let store = InMemoryLedgerStore::new(explorer);
//! store.record_transaction(&finalized)?;
//!
//! let issued = RecordQuery::new().with_type(RecordType::Issue);
//! let averages = store.average_quantity(&issued, RecordField::ToHolder, SortDirection::Desc);
//! ```

pub mod adapters;
pub mod error;
pub mod ports;
pub mod query;

pub use adapters::memory::InMemoryLedgerStore;
pub use error::{StoreError, StoreResult};
pub use ports::LedgerStore;
pub use query::{average_quantity_by, GroupAverage, RecordQuery, SortDirection};

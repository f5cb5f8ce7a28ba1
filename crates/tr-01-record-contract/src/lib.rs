//! # tr-01-record-contract
//!
//! The transaction record and the rules every proposal carrying one must obey.
//!
//! ## Overview
//!
//! A *record* is a write-once annotation attached to a value transfer. It names
//! an *explorer*, the third party that must co-sign every record before it
//! becomes valid. Records travel inside a *proposal bundle* alongside other,
//! unrelated ledger changes (the value transfer itself).
//!
//! This crate provides:
//! - **`RecordEntity`**: the immutable record, invariants checked at construction
//! - **`ProposalBundle`**: frozen, content-addressed set of inputs, outputs and commands
//! - **`SignedBundle` / `FinalizedBundle`**: signatures collected on a bundle id
//! - **`RecordValidator`**: the pure shape/authorization rule engine
//! - **`PersistentRecord`**: the flat projection handed to storage
//!
//! ## Validation Rules
//!
//! | Order | Rule | Failure |
//! |-------|------|---------|
//! | 1 | exactly one record `Create` command | `ProposalShape` |
//! | 2 | no record among inputs | `ProposalShape` |
//! | 3 | at least one record among outputs | `ProposalShape` |
//! | 4 | each record's explorer key signs the `Create` command | `Authorization` |
//!
//! Entries that are not record-related are ignored, never rejected.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tr_01_record_contract::{BundleBuilder, Command, LedgerState, RecordEntity, RecordType, RecordValidator};
//!
//! let record = RecordEntity::new(explorer.clone(), now, RecordType::Issue, "Bank", "Alice", 100)?;
//! let mut builder = BundleBuilder::new(notary);
//! builder
//!     .add_output(LedgerState::Record(record))
//!     .add_command(Command::create_record([explorer.owning_key]));
//! let bundle = builder.build()?;
//!
//! RecordValidator::validate(&bundle)?;
//! ```

pub mod domain;
pub mod error;
pub mod schema;
pub mod validator;

pub use domain::bundle::{
    BundleBuilder, Command, CommandData, ExternalState, LedgerState, ProposalBundle, RecordCommand,
    StateAndRef, StateRef, RECORD_CONTRACT_ID,
};
pub use domain::record::{RecordEntity, RecordType};
pub use domain::transaction::{FinalizedBundle, SignedBundle, TransactionSignature};
pub use error::{RecordError, RecordResult, ValidationError, ValueConstraintError, ViolationCategory};
pub use schema::{IdentityResolver, PersistentRecord, RecordField};
pub use validator::RecordValidator;

//! # tr-03-record-flows
//!
//! Signing and finality flows for explorer-attested transaction records.
//!
//! ## Architecture
//!
//! An initiator builds a proposal bundle carrying a record (and optionally a
//! fiat token issuance), collects the explorer's counter-signature, submits
//! the bundle to a notary and distributes the finalized bundle to every
//! counterparty:
//!
//! ```text
//! Initiator                       Explorer (SIGNER)          Holder (PARTICIPANT)
//!     │ ── Role ──────────────────→ │                              │
//!     │ ── Role ─────────────────────────────────────────────────→ │
//!     │ ── SignatureRequest ──────→ │ validate + check             │
//!     │ ←─ SignatureResponse ────── │                              │
//!     │ ══ submit ══→ [Notary]                                     │
//!     │ ── Finalized ─────────────→ │ verify + store               │
//!     │ ── Finalized ────────────────────────────────────────────→ │ verify + store
//!     │ ←─ StorageAck ───────────── │                              │
//!     │ ←─ StorageAck ───────────────────────────────────────────── │
//! ```
//!
//! Nothing is stored anywhere before the notary has signed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tr_03_record_flows::{RecordFlowApi, RecordFlowConfig, RecordFlowDependencies, RecordFlowService};
//!
//! let service = Arc::new(RecordFlowService::new(RecordFlowConfig::from_env(), deps)?);
//! let _server = service.serve(BusSessionListener::register(&network, service.party()));
//!
//! let finalized = service.issue_with_record(&alice, 100, &explorer).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod builder;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod ports;
pub mod responder;
pub mod service;

pub use adapters::{
    BusSession, BusSessionInitiator, BusSessionListener, FiatTokenModule, FixedClock,
    FungibleToken, InMemoryNotary, SystemClock, FUNGIBLE_TOKEN_CONTRACT,
};
pub use builder::ProposalBuilder;
pub use config::{ConfigError, RecordFlowConfig};
pub use coordinator::SigningCoordinator;
pub use domain::{
    CounterpartyRole, InitiatorState, NodeIdentity, ResponderState, SessionMessage,
};
pub use error::{ErrorKind, FlowError, FlowResult};
pub use ports::{
    AcceptAll, Clock, ConsensusAuthority, ConsensusOutcome, FlowSession, ProposalCheck,
    ProposalRequest, RecordFlowApi, SessionAcceptor, SessionInitiator, TransferParams,
    ValueTransferArtifact, ValueTransferModule,
};
pub use responder::CounterpartyResponder;
pub use service::{RecordFlowDependencies, RecordFlowService};

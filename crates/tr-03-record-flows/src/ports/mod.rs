//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::{ProposalRequest, RecordFlowApi, TransferParams};
pub use outbound::{
    AcceptAll, Clock, ConsensusAuthority, ConsensusOutcome, FlowSession, ProposalCheck,
    SessionAcceptor, SessionInitiator, ValueTransferArtifact, ValueTransferModule,
};

//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Value transfer, consensus, sessions, the counter-signing hook and time.

use crate::domain::SessionMessage;
use crate::error::FlowResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::Party;
use tr_01_record_contract::{
    BundleBuilder, Command, LedgerState, ProposalBundle, SignedBundle, StateAndRef, StateRef,
    TransactionSignature,
};

/// States and commands a value transfer contributes to a bundle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueTransferArtifact {
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<LedgerState>,
    pub commands: Vec<Command>,
}

/// Builds the value-transfer part of a proposal.
pub trait ValueTransferModule: Send + Sync {
    fn create_value_transfer(
        &self,
        quantity: i64,
        issuer: &Party,
        holder: &Party,
    ) -> FlowResult<ValueTransferArtifact>;

    fn attach_value_transfer(&self, builder: &mut BundleBuilder, artifact: ValueTransferArtifact) {
        for input in artifact.inputs {
            builder.add_input(input);
        }
        for output in artifact.outputs {
            builder.add_output(output);
        }
        for command in artifact.commands {
            builder.add_command(command);
        }
    }
}

/// Answer of the consensus authority to a submission.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsensusOutcome {
    /// Committed; carries the notary's signature over the bundle id.
    Accepted(TransactionSignature),
    /// Inputs already consumed by another committed bundle.
    Conflict(Vec<StateRef>),
    /// Refused for any other reason.
    Rejected(String),
}

/// Conflict detection and total order. Callers impose their own timeout.
#[async_trait]
pub trait ConsensusAuthority: Send + Sync {
    async fn submit(&self, signed: &SignedBundle) -> ConsensusOutcome;
}

/// One end of a flow session.
#[async_trait]
pub trait FlowSession: Send + Sync {
    fn counterparty(&self) -> &Party;

    async fn send(&self, message: SessionMessage) -> FlowResult<()>;

    /// Next message from the counterparty. Waits indefinitely.
    async fn receive(&self) -> FlowResult<SessionMessage>;
}

/// Opens sessions to other parties.
#[async_trait]
pub trait SessionInitiator: Send + Sync {
    type Session: FlowSession + 'static;

    async fn open(&self, counterparty: &Party) -> FlowResult<Self::Session>;
}

/// Hands out sessions other parties opened to us.
#[async_trait]
pub trait SessionAcceptor: Send {
    type Session: FlowSession + 'static;

    /// `None` once no further sessions can arrive.
    async fn accept(&mut self) -> Option<Self::Session>;
}

/// Extra checks a signer applies before counter-signing.
pub trait ProposalCheck: Send + Sync {
    /// `Err(reason)` refuses the proposal.
    fn check(&self, bundle: &ProposalBundle, initiator: &Party) -> Result<(), String>;
}

/// Accepts every proposal that passed validation.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl ProposalCheck for AcceptAll {
    fn check(&self, _bundle: &ProposalBundle, _initiator: &Party) -> Result<(), String> {
        Ok(())
    }
}

/// Time source for record timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

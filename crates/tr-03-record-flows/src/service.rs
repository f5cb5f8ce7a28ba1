//! Record Flow Service
//!
//! Entry point for a node: starts proposals as initiator and serves
//! incoming sessions as responder.

use crate::builder::ProposalBuilder;
use crate::config::RecordFlowConfig;
use crate::coordinator::SigningCoordinator;
use crate::domain::NodeIdentity;
use crate::error::FlowResult;
use crate::ports::{
    Clock, ConsensusAuthority, FlowSession, ProposalCheck, ProposalRequest, RecordFlowApi,
    SessionAcceptor, SessionInitiator, ValueTransferModule,
};
use crate::responder::CounterpartyResponder;
use async_trait::async_trait;
use shared_types::{Party, PartyDirectory};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tr_01_record_contract::FinalizedBundle;
use tr_02_ledger_store::LedgerStore;
use tracing::{debug, info};

/// Dependencies for RecordFlowService
pub struct RecordFlowDependencies<S, V> {
    pub identity: Arc<NodeIdentity>,
    pub directory: Arc<PartyDirectory>,
    pub store: Arc<dyn LedgerStore>,
    pub sessions: Arc<S>,
    pub consensus: Arc<dyn ConsensusAuthority>,
    pub value_transfer: Arc<V>,
    pub check: Arc<dyn ProposalCheck>,
    pub clock: Arc<dyn Clock>,
}

pub struct RecordFlowService<S, V>
where
    S: SessionInitiator,
    V: ValueTransferModule,
{
    identity: Arc<NodeIdentity>,
    directory: Arc<PartyDirectory>,
    store: Arc<dyn LedgerStore>,
    sessions: Arc<S>,
    consensus: Arc<dyn ConsensusAuthority>,
    check: Arc<dyn ProposalCheck>,
    clock: Arc<dyn Clock>,
    builder: ProposalBuilder<V>,
    config: RecordFlowConfig,
}

impl<S, V> RecordFlowService<S, V>
where
    S: SessionInitiator + 'static,
    V: ValueTransferModule + 'static,
{
    /// Create a service. Fails on invalid configuration.
    pub fn new(config: RecordFlowConfig, deps: RecordFlowDependencies<S, V>) -> FlowResult<Self> {
        config.validate()?;
        let builder = ProposalBuilder::new(
            Arc::clone(&deps.directory),
            deps.value_transfer,
            config.preferred_notary.clone(),
        );
        Ok(Self {
            identity: deps.identity,
            directory: deps.directory,
            store: deps.store,
            sessions: deps.sessions,
            consensus: deps.consensus,
            check: deps.check,
            clock: deps.clock,
            builder,
            config,
        })
    }

    pub fn party(&self) -> &Party {
        self.identity.party()
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn config(&self) -> &RecordFlowConfig {
        &self.config
    }

    /// Serve one incoming session as responder.
    pub async fn respond<F: FlowSession>(&self, session: F) -> FlowResult<FinalizedBundle> {
        let mut responder = CounterpartyResponder::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.directory),
            Arc::clone(&self.store),
            Arc::clone(&self.check),
            session,
            self.config.session_timeout,
            self.config.finality_timeout,
        );
        responder.run().await
    }

    /// Accept sessions until the acceptor is exhausted, one responder task
    /// per session.
    pub fn serve<A>(self: &Arc<Self>, mut acceptor: A) -> JoinHandle<()>
    where
        A: SessionAcceptor + 'static,
    {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            info!(party = %service.party(), "Serving record flow sessions");
            while let Some(session) = acceptor.accept().await {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    if let Err(e) = service.respond(session).await {
                        debug!(party = %service.party(), kind = ?e.kind(), "Responder task ended");
                    }
                });
            }
            debug!(party = %service.party(), "Session acceptor closed");
        })
    }
}

#[async_trait]
impl<S, V> RecordFlowApi for RecordFlowService<S, V>
where
    S: SessionInitiator + 'static,
    V: ValueTransferModule + 'static,
{
    async fn issue_with_record(
        &self,
        holder: &Party,
        quantity: i64,
        explorer: &Party,
    ) -> FlowResult<FinalizedBundle> {
        let request = ProposalRequest::issue(self.identity.party(), holder, quantity, explorer);
        self.propose(request).await
    }

    async fn propose(&self, request: ProposalRequest) -> FlowResult<FinalizedBundle> {
        let bundle = self.builder.build(&request, self.clock.now())?;
        let mut coordinator = SigningCoordinator::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.directory),
            Arc::clone(&self.sessions),
            Arc::clone(&self.consensus),
            Arc::clone(&self.store),
            &self.config,
        );
        coordinator.run(bundle).await
    }
}

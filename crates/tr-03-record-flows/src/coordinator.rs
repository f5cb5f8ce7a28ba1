//! # Signing Coordinator
//!
//! Initiator side of the record protocol. Drives one proposal from a built
//! bundle to finality:
//!
//! 1. validate locally, fail without touching the network on rejection
//! 2. sign the bundle id with the local key
//! 3. open one session per remote party and announce its role
//! 4. collect and verify counter-signatures from `SIGNER` sessions
//! 5. submit to the consensus authority
//! 6. record locally, broadcast the finalized bundle and await every
//!    storage acknowledgement
//!
//! Any failure after sessions are open sends a best-effort `Abort` so
//! responders stop waiting. Once consensus has accepted the bundle the flow
//! is `Finalized` for good: a later acknowledgement failure is reported to
//! the caller but nothing is aborted.

use crate::config::RecordFlowConfig;
use crate::domain::{
    CounterpartyRole, InitiatorEvent, InitiatorMachine, InitiatorState, NodeIdentity,
    SessionMessage,
};
use crate::error::{FlowError, FlowResult};
use crate::ports::{ConsensusAuthority, ConsensusOutcome, FlowSession, SessionInitiator};
use futures::future::join_all;
use shared_types::{short_hex, Party, PartyDirectory, PublicKey};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tr_01_record_contract::{
    FinalizedBundle, ProposalBundle, RecordValidator, SignedBundle, TransactionSignature,
};
use tr_02_ledger_store::LedgerStore;
use tracing::{debug, info, warn};

struct OpenSession<F> {
    session: F,
    role: CounterpartyRole,
}

pub struct SigningCoordinator<S: SessionInitiator> {
    identity: Arc<NodeIdentity>,
    directory: Arc<PartyDirectory>,
    sessions: Arc<S>,
    consensus: Arc<dyn ConsensusAuthority>,
    store: Arc<dyn LedgerStore>,
    session_timeout: Duration,
    consensus_timeout: Duration,
    finality_timeout: Duration,
    machine: InitiatorMachine,
}

impl<S: SessionInitiator> SigningCoordinator<S> {
    pub fn new(
        identity: Arc<NodeIdentity>,
        directory: Arc<PartyDirectory>,
        sessions: Arc<S>,
        consensus: Arc<dyn ConsensusAuthority>,
        store: Arc<dyn LedgerStore>,
        config: &RecordFlowConfig,
    ) -> Self {
        Self {
            identity,
            directory,
            sessions,
            consensus,
            store,
            session_timeout: config.session_timeout,
            consensus_timeout: config.consensus_timeout,
            finality_timeout: config.finality_timeout,
            machine: InitiatorMachine::new(),
        }
    }

    pub fn state(&self) -> &InitiatorState {
        self.machine.state()
    }

    /// Drive `bundle` to finality.
    pub async fn run(&mut self, bundle: ProposalBundle) -> FlowResult<FinalizedBundle> {
        let tx_id = short_hex(&bundle.id());
        let mut sessions = Vec::new();

        let result = self.drive(bundle, &mut sessions).await;
        if let Err(err) = &result {
            if *self.machine.state() != InitiatorState::Finalized {
                Self::abort_all(&sessions, &err.to_string()).await;
            }
            self.machine.fail(err.to_string());
            warn!(
                tx_id = %tx_id,
                kind = ?err.kind(),
                state = %self.machine.state(),
                error = %err,
                "Signing flow failed"
            );
        }
        result
    }

    async fn drive(
        &mut self,
        bundle: ProposalBundle,
        sessions: &mut Vec<OpenSession<S::Session>>,
    ) -> FlowResult<FinalizedBundle> {
        let tx_id = short_hex(&bundle.id());

        RecordValidator::validate(&bundle)?;
        self.machine.process_event(InitiatorEvent::Validated)?;

        let mut signed = SignedBundle::new(bundle);
        self.identity.sign(&mut signed);
        self.machine.process_event(InitiatorEvent::Signed)?;
        debug!(tx_id = %tx_id, "Signed locally");

        for (party, role) in self.counterparties(signed.bundle())? {
            let session = self.sessions.open(&party).await?;
            session.send(SessionMessage::Role(role)).await?;
            debug!(tx_id = %tx_id, party = %party, role = %role, "Session opened");
            sessions.push(OpenSession { session, role });
        }
        self.machine.process_event(InitiatorEvent::SessionsOpened)?;

        self.collect_signatures(&mut signed, sessions).await?;
        let missing = signed.missing_signatures();
        if !missing.is_empty() {
            return Err(FlowError::MissingSignatures {
                missing: missing.len(),
            });
        }
        self.machine
            .process_event(InitiatorEvent::SignaturesCollected)?;
        debug!(tx_id = %tx_id, signatures = signed.signatures().len(), "Counter-signatures collected");

        let notary_signature = self.notarise(&signed).await?;
        let finalized = FinalizedBundle::new(signed, notary_signature);
        finalized.verify()?;
        self.machine.process_event(InitiatorEvent::ConsensusAccepted)?;

        self.store.record_transaction(&finalized)?;
        self.broadcast_finality(&finalized, sessions).await?;

        info!(
            tx_id = %tx_id,
            counterparties = sessions.len(),
            "Proposal finalized"
        );
        Ok(finalized)
    }

    /// Remote parties referenced by the bundle, with their roles.
    ///
    /// Covers every state participant and every required signer; a party is a
    /// `Signer` iff its key signs the record `Create` command.
    fn counterparties(&self, bundle: &ProposalBundle) -> FlowResult<Vec<(Party, CounterpartyRole)>> {
        let local = self.identity.party();
        let create_signers: BTreeSet<PublicKey> = bundle
            .create_commands()
            .flat_map(|c| c.signers.iter().copied())
            .collect();

        let mut parties: BTreeSet<Party> = bundle.participants();
        for key in bundle.required_signers() {
            if key == local.owning_key || parties.iter().any(|p| p.owning_key == key) {
                continue;
            }
            let party = self
                .directory
                .party_from_key(&key)
                .ok_or_else(|| FlowError::UnknownParty {
                    name: short_hex(&key),
                })?;
            parties.insert(party);
        }

        Ok(parties
            .into_iter()
            .filter(|p| p.owning_key != local.owning_key)
            .map(|p| {
                let role = if create_signers.contains(&p.owning_key) {
                    CounterpartyRole::Signer
                } else {
                    CounterpartyRole::Participant
                };
                (p, role)
            })
            .collect())
    }

    async fn collect_signatures(
        &self,
        signed: &mut SignedBundle,
        sessions: &[OpenSession<S::Session>],
    ) -> FlowResult<()> {
        let request = SessionMessage::SignatureRequest(signed.clone());
        let exchanges = sessions
            .iter()
            .filter(|s| s.role == CounterpartyRole::Signer)
            .map(|s| self.request_signature(&s.session, request.clone()));

        for (party, response) in join_all(exchanges).await {
            let signature = response?;
            if signature.by != party.owning_key {
                return Err(FlowError::InvalidCounterSignature {
                    party: party.name,
                    reason: format!("signed with key {}", short_hex(&signature.by)),
                });
            }
            signed
                .add_signature(signature)
                .map_err(|e| FlowError::InvalidCounterSignature {
                    party: party.name.clone(),
                    reason: e.to_string(),
                })?;
            debug!(party = %party, "Counter-signature verified");
        }
        Ok(())
    }

    async fn request_signature(
        &self,
        session: &S::Session,
        request: SessionMessage,
    ) -> (Party, FlowResult<TransactionSignature>) {
        let party = session.counterparty().clone();
        let result = self.exchange_signature(session, &party, request).await;
        (party, result)
    }

    async fn exchange_signature(
        &self,
        session: &S::Session,
        party: &Party,
        request: SessionMessage,
    ) -> FlowResult<TransactionSignature> {
        session.send(request).await?;
        let reply = timeout(self.session_timeout, session.receive())
            .await
            .map_err(|_| FlowError::timeout(format!("counter-signature from {party}")))??;
        match reply {
            SessionMessage::SignatureResponse(signature) => Ok(signature),
            SessionMessage::Rejection { reason } => {
                warn!(party = %party, reason = %reason, "Counterparty refused to sign");
                Err(FlowError::CounterpartyRejection {
                    party: party.name.clone(),
                    reason,
                })
            }
            other => Err(FlowError::violation(
                party,
                format!("expected SignatureResponse, got {}", other.kind()),
            )),
        }
    }

    async fn notarise(&self, signed: &SignedBundle) -> FlowResult<TransactionSignature> {
        let outcome = timeout(self.consensus_timeout, self.consensus.submit(signed))
            .await
            .map_err(|_| FlowError::timeout("consensus authority"))?;
        match outcome {
            ConsensusOutcome::Accepted(signature) => Ok(signature),
            ConsensusOutcome::Conflict(refs) => Err(FlowError::ConsensusConflict { refs }),
            ConsensusOutcome::Rejected(reason) => Err(FlowError::ConsensusRejected { reason }),
        }
    }

    async fn broadcast_finality(
        &self,
        finalized: &FinalizedBundle,
        sessions: &[OpenSession<S::Session>],
    ) -> FlowResult<()> {
        let acks = sessions
            .iter()
            .map(|s| self.deliver_finality(&s.session, finalized));
        join_all(acks).await.into_iter().collect()
    }

    async fn deliver_finality(
        &self,
        session: &S::Session,
        finalized: &FinalizedBundle,
    ) -> FlowResult<()> {
        let party = session.counterparty();
        session
            .send(SessionMessage::Finalized(finalized.clone()))
            .await?;
        let reply = timeout(self.finality_timeout, session.receive())
            .await
            .map_err(|_| FlowError::timeout(format!("storage acknowledgement from {party}")))??;
        match reply {
            SessionMessage::StorageAck { tx_id } if tx_id == finalized.tx_id() => Ok(()),
            SessionMessage::StorageAck { .. } => {
                Err(FlowError::violation(party, "acknowledged a different bundle"))
            }
            SessionMessage::Rejection { reason } => Err(FlowError::CounterpartyRejection {
                party: party.name.clone(),
                reason,
            }),
            other => Err(FlowError::violation(
                party,
                format!("expected StorageAck, got {}", other.kind()),
            )),
        }
    }

    async fn abort_all(sessions: &[OpenSession<S::Session>], reason: &str) {
        for open in sessions {
            let message = SessionMessage::Abort {
                reason: reason.to_string(),
            };
            if let Err(e) = open.session.send(message).await {
                debug!(party = %open.session.counterparty(), error = %e, "Abort not delivered");
            }
        }
    }
}

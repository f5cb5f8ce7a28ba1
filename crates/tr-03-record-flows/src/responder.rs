//! # Counterparty Responder
//!
//! Responder side of the record protocol, one instance per incoming session.
//! A `SIGNER` re-validates the proposal and counter-signs it; a `PARTICIPANT`
//! only waits for finality. Both verify the finalized bundle before storing
//! it. Nothing reaches the store before finality.

use crate::domain::{
    CounterpartyRole, NodeIdentity, ResponderEvent, ResponderMachine, ResponderState,
    SessionMessage,
};
use crate::error::{FlowError, FlowResult};
use crate::ports::{FlowSession, ProposalCheck};
use shared_types::{short_hex, Hash, Party, PartyDirectory};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tr_01_record_contract::{FinalizedBundle, RecordValidator, SignedBundle};
use tr_02_ledger_store::LedgerStore;
use tracing::{debug, info, warn};

pub struct CounterpartyResponder<F: FlowSession> {
    identity: Arc<NodeIdentity>,
    directory: Arc<PartyDirectory>,
    store: Arc<dyn LedgerStore>,
    check: Arc<dyn ProposalCheck>,
    session: F,
    session_timeout: Duration,
    finality_timeout: Duration,
    machine: ResponderMachine,
}

impl<F: FlowSession> CounterpartyResponder<F> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: Arc<NodeIdentity>,
        directory: Arc<PartyDirectory>,
        store: Arc<dyn LedgerStore>,
        check: Arc<dyn ProposalCheck>,
        session: F,
        session_timeout: Duration,
        finality_timeout: Duration,
    ) -> Self {
        Self {
            identity,
            directory,
            store,
            check,
            session,
            session_timeout,
            finality_timeout,
            machine: ResponderMachine::new(),
        }
    }

    pub fn state(&self) -> &ResponderState {
        self.machine.state()
    }

    /// Serve the session to completion. Returns the stored bundle.
    pub async fn run(&mut self) -> FlowResult<FinalizedBundle> {
        let result = self.drive().await;
        if let Err(err) = &result {
            self.machine.fail(err.to_string());
            warn!(
                party = %self.identity.party(),
                initiator = %self.session.counterparty(),
                kind = ?err.kind(),
                state = %self.machine.state(),
                error = %err,
                "Responder flow ended without finality"
            );
        }
        result
    }

    async fn drive(&mut self) -> FlowResult<FinalizedBundle> {
        let initiator = self.session.counterparty().clone();

        let role = match self.receive(self.session_timeout, "role").await? {
            SessionMessage::Role(role) => role,
            other => return Err(self.unexpected(&initiator, "Role", other)),
        };
        self.machine
            .process_event(ResponderEvent::RoleAssigned(role))?;
        debug!(party = %self.identity.party(), initiator = %initiator, role = %role, "Role assigned");

        let signed_id = match role {
            CounterpartyRole::Signer => Some(self.countersign(&initiator).await?),
            CounterpartyRole::Participant => {
                self.machine.process_event(ResponderEvent::SigningSkipped)?;
                None
            }
        };

        let finalized = match self.receive(self.finality_timeout, "finality").await? {
            SessionMessage::Finalized(finalized) => finalized,
            other => return Err(self.unexpected(&initiator, "Finalized", other)),
        };

        if let Err(reason) = self.review_finality(&finalized, signed_id) {
            self.session
                .send(SessionMessage::Rejection {
                    reason: reason.clone(),
                })
                .await?;
            return Err(FlowError::violation(&initiator, reason));
        }

        self.store.record_transaction(&finalized)?;
        self.session
            .send(SessionMessage::StorageAck {
                tx_id: finalized.tx_id(),
            })
            .await?;
        self.machine.process_event(ResponderEvent::FinalityStored)?;

        info!(
            party = %self.identity.party(),
            tx_id = %short_hex(&finalized.tx_id()),
            role = %role,
            "Finalized bundle stored"
        );
        Ok(finalized)
    }

    /// Review the proposal and answer with a signature or a rejection.
    async fn countersign(&mut self, initiator: &Party) -> FlowResult<Hash> {
        let signed = match self.receive(self.session_timeout, "signature request").await? {
            SessionMessage::SignatureRequest(signed) => signed,
            other => return Err(self.unexpected(initiator, "SignatureRequest", other)),
        };

        match self.review_proposal(&signed, initiator) {
            Ok(()) => {
                let signature = self.identity.signature_for(&signed);
                self.session
                    .send(SessionMessage::SignatureResponse(signature))
                    .await?;
                self.machine.process_event(ResponderEvent::Countersigned)?;
                debug!(
                    party = %self.identity.party(),
                    tx_id = %short_hex(&signed.id()),
                    "Counter-signed"
                );
                Ok(signed.id())
            }
            Err(reason) => {
                warn!(
                    party = %self.identity.party(),
                    tx_id = %short_hex(&signed.id()),
                    reason = %reason,
                    "Refusing to sign"
                );
                self.session
                    .send(SessionMessage::Rejection {
                        reason: reason.clone(),
                    })
                    .await?;
                self.machine
                    .process_event(ResponderEvent::Refused(reason.clone()))?;
                Err(FlowError::CounterpartyRejection {
                    party: self.identity.party().name.clone(),
                    reason,
                })
            }
        }
    }

    fn review_proposal(&self, signed: &SignedBundle, initiator: &Party) -> Result<(), String> {
        let bundle = signed.bundle();

        signed.verify_signatures().map_err(|e| e.to_string())?;
        if !signed.signers().contains(&initiator.owning_key) {
            return Err(format!("proposal is not signed by initiator {initiator}"));
        }
        RecordValidator::validate(bundle).map_err(|e| e.to_string())?;
        if !bundle
            .required_signers()
            .contains(&self.identity.party().owning_key)
        {
            return Err(format!(
                "{} is not a required signer",
                self.identity.party()
            ));
        }
        self.check.check(bundle, initiator)
    }

    fn review_finality(
        &self,
        finalized: &FinalizedBundle,
        signed_id: Option<Hash>,
    ) -> Result<(), String> {
        if let Some(id) = signed_id {
            if id != finalized.tx_id() {
                return Err(format!(
                    "finalized bundle {} differs from signed bundle {}",
                    short_hex(&finalized.tx_id()),
                    short_hex(&id)
                ));
            }
        }
        if !self.directory.is_notary(finalized.bundle().notary()) {
            return Err(format!(
                "{} is not a known notary",
                finalized.bundle().notary()
            ));
        }
        finalized.verify().map_err(|e| e.to_string())?;
        RecordValidator::validate(finalized.bundle()).map_err(|e| e.to_string())
    }

    /// Next message within `limit`. An `Abort` ends the flow.
    async fn receive(&self, limit: Duration, waiting_for: &str) -> FlowResult<SessionMessage> {
        let initiator = self.session.counterparty();
        let message = timeout(limit, self.session.receive())
            .await
            .map_err(|_| FlowError::timeout(format!("{waiting_for} from {initiator}")))??;

        if let SessionMessage::Abort { reason } = message {
            return Err(FlowError::Aborted {
                party: initiator.name.clone(),
                reason,
            });
        }
        Ok(message)
    }

    fn unexpected(&self, initiator: &Party, expected: &str, got: SessionMessage) -> FlowError {
        FlowError::violation(
            initiator,
            format!("expected {expected}, got {}", got.kind()),
        )
    }
}

//! # In-Memory Notary
//!
//! Single consensus authority for a test network. Commits are serialised
//! under one mutex, which gives a total order over conflicting proposals.

use crate::domain::NodeIdentity;
use crate::ports::{ConsensusAuthority, ConsensusOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{short_hex, Hash, Party};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tr_01_record_contract::{SignedBundle, StateRef};
use tracing::{debug, info, warn};

#[derive(Default)]
struct NotaryLedger {
    spent: HashMap<StateRef, Hash>,
    committed: HashSet<Hash>,
}

pub struct InMemoryNotary {
    identity: NodeIdentity,
    ledger: Mutex<NotaryLedger>,
    latency: Option<Duration>,
}

impl InMemoryNotary {
    pub fn new(identity: NodeIdentity) -> Self {
        Self {
            identity,
            ledger: Mutex::new(NotaryLedger::default()),
            latency: None,
        }
    }

    /// Delay every answer, to exercise caller timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn party(&self) -> &Party {
        self.identity.party()
    }

    pub fn committed_count(&self) -> usize {
        self.ledger.lock().committed.len()
    }

    pub fn is_spent(&self, reference: &StateRef) -> bool {
        self.ledger.lock().spent.contains_key(reference)
    }

    fn decide(&self, signed: &SignedBundle) -> ConsensusOutcome {
        let bundle = signed.bundle();
        let tx_id = signed.id();

        if bundle.notary() != self.identity.party() {
            return ConsensusOutcome::Rejected(format!(
                "bundle names notary {}, not {}",
                bundle.notary(),
                self.identity.party()
            ));
        }
        if let Err(e) = signed.verify_complete() {
            return ConsensusOutcome::Rejected(e.to_string());
        }

        let mut ledger = self.ledger.lock();
        if ledger.committed.contains(&tx_id) {
            debug!(tx_id = %short_hex(&tx_id), "Resubmission of committed bundle");
            return ConsensusOutcome::Accepted(self.identity.signature_for(signed));
        }

        let conflicts: Vec<StateRef> = bundle
            .input_refs()
            .into_iter()
            .filter(|r| ledger.spent.get(r).is_some_and(|by| *by != tx_id))
            .collect();
        if !conflicts.is_empty() {
            return ConsensusOutcome::Conflict(conflicts);
        }

        for reference in bundle.input_refs() {
            ledger.spent.insert(reference, tx_id);
        }
        ledger.committed.insert(tx_id);
        ConsensusOutcome::Accepted(self.identity.signature_for(signed))
    }
}

#[async_trait]
impl ConsensusAuthority for InMemoryNotary {
    async fn submit(&self, signed: &SignedBundle) -> ConsensusOutcome {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let outcome = self.decide(signed);
        let tx_id = short_hex(&signed.id());
        match &outcome {
            ConsensusOutcome::Accepted(_) => info!(tx_id = %tx_id, "Notarised"),
            ConsensusOutcome::Conflict(refs) => {
                warn!(tx_id = %tx_id, conflicts = refs.len(), "Double spend refused")
            }
            ConsensusOutcome::Rejected(reason) => {
                warn!(tx_id = %tx_id, reason = %reason, "Notarisation refused")
            }
        }
        outcome
    }
}

//! # In-Memory Ledger Store
//!
//! Single `RwLock` over all views so a recorded bundle becomes visible in
//! transaction storage and the vault atomically.

use crate::error::{StoreError, StoreResult};
use crate::ports::LedgerStore;
use parking_lot::RwLock;
use shared_types::{short_hex, Hash, Party};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tr_01_record_contract::{
    FinalizedBundle, LedgerState, PersistentRecord, RecordEntity, StateAndRef, StateRef,
};
use tracing::{debug, info};

#[derive(Default)]
struct LedgerInner {
    transactions: HashMap<Hash, FinalizedBundle>,
    order: Vec<Hash>,
    unconsumed: BTreeMap<StateRef, LedgerState>,
    consumed: BTreeSet<StateRef>,
    rows: Vec<PersistentRecord>,
}

pub struct InMemoryLedgerStore {
    owner: Party,
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedgerStore {
    pub fn new(owner: Party) -> Self {
        Self {
            owner,
            inner: RwLock::new(LedgerInner::default()),
        }
    }

    fn is_relevant(&self, state: &LedgerState) -> bool {
        state.participants().iter().any(|p| p == &self.owner)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn owner(&self) -> &Party {
        &self.owner
    }

    fn record_transaction(&self, finalized: &FinalizedBundle) -> StoreResult<bool> {
        let tx_id = finalized.tx_id();
        finalized
            .verify()
            .map_err(|source| StoreError::InvalidTransaction {
                tx_id: short_hex(&tx_id),
                source,
            })?;

        let mut inner = self.inner.write();
        if inner.transactions.contains_key(&tx_id) {
            debug!(owner = %self.owner, tx_id = %short_hex(&tx_id), "Transaction already recorded");
            return Ok(false);
        }

        let bundle = finalized.bundle();
        for reference in bundle.input_refs() {
            if inner.unconsumed.remove(&reference).is_some() {
                inner.consumed.insert(reference);
            }
        }

        let mut relevant = 0usize;
        for output in bundle.output_refs() {
            if !self.is_relevant(&output.state) {
                continue;
            }
            if let LedgerState::Record(record) = &output.state {
                inner.rows.push(PersistentRecord::from(record));
            }
            inner.unconsumed.insert(output.reference, output.state);
            relevant += 1;
        }

        inner.transactions.insert(tx_id, finalized.clone());
        inner.order.push(tx_id);

        info!(
            owner = %self.owner,
            tx_id = %short_hex(&tx_id),
            relevant_states = relevant,
            "Transaction recorded"
        );
        Ok(true)
    }

    fn transaction(&self, tx_id: &Hash) -> Option<FinalizedBundle> {
        self.inner.read().transactions.get(tx_id).cloned()
    }

    fn transaction_count(&self) -> usize {
        self.inner.read().order.len()
    }

    fn recorded_records(&self) -> Vec<RecordEntity> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.transactions.get(id))
            .flat_map(|tx| tx.records().cloned().collect::<Vec<_>>())
            .collect()
    }

    fn vault_states(&self) -> Vec<StateAndRef> {
        self.inner
            .read()
            .unconsumed
            .iter()
            .map(|(reference, state)| StateAndRef {
                state: state.clone(),
                reference: *reference,
            })
            .collect()
    }

    fn is_consumed(&self, reference: &StateRef) -> bool {
        self.inner.read().consumed.contains(reference)
    }

    fn record_rows(&self) -> Vec<PersistentRecord> {
        self.inner.read().rows.clone()
    }
}

//! # Ledger Store Port
//!
//! Storage is shared by every flow running on a node, so implementations use
//! interior locking and every method takes `&self`.

use crate::error::StoreResult;
use crate::query::{average_quantity_by, GroupAverage, RecordQuery, SortDirection};
use shared_types::{Hash, Party};
use tr_01_record_contract::{
    FinalizedBundle, PersistentRecord, RecordEntity, RecordField, StateAndRef, StateRef,
};

pub trait LedgerStore: Send + Sync {
    /// The party whose ledger this is.
    fn owner(&self) -> &Party;

    /// Record a finalized bundle and update the vault.
    ///
    /// Returns `false` if the bundle was already recorded; nothing changes in
    /// that case.
    fn record_transaction(&self, finalized: &FinalizedBundle) -> StoreResult<bool>;

    /// Look up a recorded bundle by id.
    fn transaction(&self, tx_id: &Hash) -> Option<FinalizedBundle>;

    fn transaction_count(&self) -> usize;

    /// Records produced by every recorded bundle, relevant or not, in
    /// recording order.
    fn recorded_records(&self) -> Vec<RecordEntity>;

    /// Unconsumed vault states.
    fn vault_states(&self) -> Vec<StateAndRef>;

    fn is_consumed(&self, reference: &StateRef) -> bool;

    /// Record projections in the vault.
    fn record_rows(&self) -> Vec<PersistentRecord>;

    /// Record states in the vault.
    fn vault_records(&self) -> Vec<RecordEntity> {
        self.vault_states()
            .into_iter()
            .filter_map(|s| s.state.as_record().cloned())
            .collect()
    }

    /// Vault record projections matching `query`.
    fn query_records(&self, query: &RecordQuery) -> Vec<PersistentRecord> {
        query.apply(&self.record_rows())
    }

    /// Average quantity of the matching vault records, grouped by `group_by`.
    fn average_quantity(
        &self,
        query: &RecordQuery,
        group_by: RecordField,
        direction: SortDirection,
    ) -> Vec<GroupAverage> {
        average_quantity_by(&self.query_records(query), group_by, direction)
    }
}

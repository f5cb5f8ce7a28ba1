//! Driving Ports (API - Inbound)

use crate::error::FlowResult;
use async_trait::async_trait;
use shared_types::Party;
use tr_01_record_contract::{FinalizedBundle, RecordType};

/// Value transfer to include in a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferParams {
    pub quantity: i64,
    pub issuer: Party,
    pub holder: Party,
}

/// Everything needed to propose one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRequest {
    pub explorer: Party,
    pub record_type: RecordType,
    pub from_holder: String,
    pub to_holder: String,
    pub quantity: i64,
    /// `None` proposes the record on its own.
    pub transfer: Option<TransferParams>,
}

impl ProposalRequest {
    /// Issue `quantity` tokens from `issuer` to `holder` and record it.
    pub fn issue(issuer: &Party, holder: &Party, quantity: i64, explorer: &Party) -> Self {
        Self {
            explorer: explorer.clone(),
            record_type: RecordType::Issue,
            from_holder: issuer.name.clone(),
            to_holder: holder.name.clone(),
            quantity,
            transfer: Some(TransferParams {
                quantity,
                issuer: issuer.clone(),
                holder: holder.clone(),
            }),
        }
    }
}

/// Record flow operations started by the local node.
#[async_trait]
pub trait RecordFlowApi: Send + Sync {
    /// Issue fiat tokens to `holder` with an explorer-attested ISSUE record.
    async fn issue_with_record(
        &self,
        holder: &Party,
        quantity: i64,
        explorer: &Party,
    ) -> FlowResult<FinalizedBundle>;

    /// Build, counter-sign and finalize an arbitrary record proposal.
    async fn propose(&self, request: ProposalRequest) -> FlowResult<FinalizedBundle>;
}

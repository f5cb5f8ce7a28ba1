//! Fungible fiat token issuance.
//!
//! Amounts are held in the smallest denomination of the currency: issuing
//! 100 USD with two fraction digits produces a token of amount 10 000.
//! The holder is the token's only participant; the issuer signs the issue
//! command.

use crate::config::RecordFlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::ports::{ValueTransferArtifact, ValueTransferModule};
use serde::{Deserialize, Serialize};
use shared_types::Party;
use tr_01_record_contract::{Command, CommandData, ExternalState, LedgerState};
use tracing::debug;

pub const FUNGIBLE_TOKEN_CONTRACT: &str = "tr.tokens.FungibleToken";
pub const ISSUE_TOKEN_COMMAND: &str = "IssueTokenCommand";

/// Token state payload carried in `ExternalState::data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleToken {
    pub token_type: String,
    pub fraction_digits: u32,
    pub issuer: Party,
    pub holder: Party,
    pub amount: i64,
}

#[derive(Clone, Debug)]
pub struct FiatTokenModule {
    token_type: String,
    fraction_digits: u32,
}

impl FiatTokenModule {
    pub fn new(token_type: impl Into<String>, fraction_digits: u32) -> Self {
        Self {
            token_type: token_type.into(),
            fraction_digits,
        }
    }

    pub fn from_config(config: &RecordFlowConfig) -> Self {
        Self::new(config.token_type.clone(), config.fraction_digits)
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// `quantity × 10^fraction_digits`, refusing negatives and overflow.
    pub fn to_smallest_unit(&self, quantity: i64) -> FlowResult<i64> {
        if quantity < 0 {
            return Err(FlowError::ValueTransfer {
                reason: format!("cannot issue a negative amount {quantity}"),
            });
        }
        10i64
            .checked_pow(self.fraction_digits)
            .and_then(|scale| quantity.checked_mul(scale))
            .ok_or_else(|| FlowError::ValueTransfer {
                reason: format!(
                    "amount {quantity} {} overflows at {} fraction digits",
                    self.token_type, self.fraction_digits
                ),
            })
    }

    /// Decode a token from a bundle state, if it is one.
    pub fn decode(state: &LedgerState) -> Option<FungibleToken> {
        let external = state.as_external()?;
        if external.contract != FUNGIBLE_TOKEN_CONTRACT {
            return None;
        }
        bincode::deserialize(&external.data).ok()
    }
}

impl ValueTransferModule for FiatTokenModule {
    fn create_value_transfer(
        &self,
        quantity: i64,
        issuer: &Party,
        holder: &Party,
    ) -> FlowResult<ValueTransferArtifact> {
        let amount = self.to_smallest_unit(quantity)?;
        let token = FungibleToken {
            token_type: self.token_type.clone(),
            fraction_digits: self.fraction_digits,
            issuer: issuer.clone(),
            holder: holder.clone(),
            amount,
        };
        let data = bincode::serialize(&token).map_err(|e| FlowError::Codec {
            reason: e.to_string(),
        })?;

        debug!(
            issuer = %issuer,
            holder = %holder,
            amount,
            token_type = %self.token_type,
            "Built token issuance"
        );

        Ok(ValueTransferArtifact {
            inputs: Vec::new(),
            outputs: vec![LedgerState::External(ExternalState {
                contract: FUNGIBLE_TOKEN_CONTRACT.to_string(),
                participants: vec![holder.clone()],
                data,
            })],
            commands: vec![Command::new(
                CommandData::External {
                    contract: FUNGIBLE_TOKEN_CONTRACT.to_string(),
                    name: ISSUE_TOKEN_COMMAND.to_string(),
                },
                [issuer.owning_key],
            )],
        })
    }
}

//! # Proposal Builder
//!
//! Assembles a bundle from a record request: notary, the optional value
//! transfer, the record output and its `Create` command. The returned bundle
//! is frozen but not yet validated.

use crate::error::{FlowError, FlowResult};
use crate::ports::{ProposalRequest, ValueTransferModule};
use chrono::{DateTime, Utc};
use shared_types::{short_hex, Party, PartyDirectory};
use std::sync::Arc;
use tr_01_record_contract::{BundleBuilder, Command, LedgerState, ProposalBundle, RecordEntity};
use tracing::{info, warn};

pub struct ProposalBuilder<V: ValueTransferModule> {
    directory: Arc<PartyDirectory>,
    value_transfer: Arc<V>,
    preferred_notary: Option<String>,
}

impl<V: ValueTransferModule> ProposalBuilder<V> {
    pub fn new(
        directory: Arc<PartyDirectory>,
        value_transfer: Arc<V>,
        preferred_notary: Option<String>,
    ) -> Self {
        Self {
            directory,
            value_transfer,
            preferred_notary,
        }
    }

    /// Preferred notary if known, otherwise the first registered one.
    pub fn resolve_notary(&self) -> FlowResult<Party> {
        if let Some(name) = &self.preferred_notary {
            if let Some(notary) = self.directory.notary(name) {
                return Ok(notary);
            }
            warn!(preferred = %name, "Preferred notary unknown, falling back to first notary");
        }
        self.directory
            .notaries()
            .into_iter()
            .next()
            .ok_or_else(|| FlowError::NoNotary {
                preferred: self.preferred_notary.clone(),
            })
    }

    pub fn build(&self, request: &ProposalRequest, now: DateTime<Utc>) -> FlowResult<ProposalBundle> {
        let notary = self.resolve_notary()?;

        let record = RecordEntity::new(
            request.explorer.clone(),
            now,
            request.record_type,
            request.from_holder.clone(),
            request.to_holder.clone(),
            request.quantity,
        )?;

        let mut builder = BundleBuilder::new(notary);
        if let Some(transfer) = &request.transfer {
            let artifact = self.value_transfer.create_value_transfer(
                transfer.quantity,
                &transfer.issuer,
                &transfer.holder,
            )?;
            self.value_transfer.attach_value_transfer(&mut builder, artifact);
        }

        let explorer_key = record.explorer().owning_key;
        builder
            .add_output(LedgerState::Record(record))
            .add_command(Command::create_record([explorer_key]));

        let bundle = builder.build()?;
        info!(
            tx_id = %short_hex(&bundle.id()),
            record_type = %request.record_type,
            from = %request.from_holder,
            to = %request.to_holder,
            quantity = request.quantity,
            explorer = %request.explorer,
            notary = %bundle.notary(),
            "Proposal built"
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FiatTokenModule;
    use crate::error::ErrorKind;
    use crate::ports::TransferParams;
    use tr_01_record_contract::{RecordType, RecordValidator};

    fn bank() -> Party {
        Party::new("Bank", [1u8; 32])
    }

    fn alice() -> Party {
        Party::new("Alice", [2u8; 32])
    }

    fn explorer() -> Party {
        Party::new("Explorer", [3u8; 32])
    }

    fn directory(notaries: &[&str]) -> Arc<PartyDirectory> {
        let directory = PartyDirectory::new();
        for (i, name) in notaries.iter().enumerate() {
            directory.register_notary(Party::new(*name, [100 + i as u8; 32]));
        }
        Arc::new(directory)
    }

    fn builder(notaries: &[&str], preferred: Option<&str>) -> ProposalBuilder<FiatTokenModule> {
        ProposalBuilder::new(
            directory(notaries),
            Arc::new(FiatTokenModule::new("USD", 2)),
            preferred.map(str::to_string),
        )
    }

    #[test]
    fn test_issue_proposal_shape() {
        let b = builder(&["Notary"], None);
        let now = Utc::now();
        let bundle = b
            .build(&ProposalRequest::issue(&bank(), &alice(), 100, &explorer()), now)
            .unwrap();

        assert_eq!(bundle.notary().name, "Notary");
        assert_eq!(bundle.outputs().len(), 2);
        assert_eq!(bundle.commands().len(), 2);

        let record = bundle.record_outputs().next().unwrap();
        assert_eq!(record.record_type(), RecordType::Issue);
        assert_eq!(record.from_holder(), "Bank");
        assert_eq!(record.to_holder(), "Alice");
        assert_eq!(record.quantity(), 100);
        assert_eq!(record.timestamp(), now);

        let create = bundle.create_commands().next().unwrap();
        assert_eq!(create.signers.len(), 1);
        assert!(create.signers.contains(&explorer().owning_key));

        assert!(RecordValidator::validate(&bundle).is_ok());
    }

    #[test]
    fn test_preferred_notary_wins() {
        let b = builder(&["NotaryA", "NotaryB"], Some("NotaryB"));
        assert_eq!(b.resolve_notary().unwrap().name, "NotaryB");
    }

    #[test]
    fn test_unknown_preferred_falls_back() {
        let b = builder(&["NotaryA", "NotaryB"], Some("Missing"));
        assert_eq!(b.resolve_notary().unwrap().name, "NotaryA");
    }

    #[test]
    fn test_no_notary() {
        let b = builder(&[], None);
        let err = b
            .build(&ProposalRequest::issue(&bank(), &alice(), 1, &explorer()), Utc::now())
            .unwrap_err();
        assert!(matches!(err, FlowError::NoNotary { .. }));
    }

    #[test]
    fn test_negative_quantity_fails_before_value_transfer() {
        let b = builder(&["Notary"], None);
        let request = ProposalRequest {
            explorer: explorer(),
            record_type: RecordType::Move,
            from_holder: "Alice".into(),
            to_holder: "Bob".into(),
            quantity: -10,
            transfer: Some(TransferParams {
                quantity: 10,
                issuer: bank(),
                holder: alice(),
            }),
        };
        let err = b.build(&request, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConstraint);
        assert!(matches!(err, FlowError::ValueConstraint(_)));
    }

    #[test]
    fn test_identical_holders() {
        let b = builder(&["Notary"], None);
        let err = b
            .build(&ProposalRequest::issue(&alice(), &alice(), 5, &explorer()), Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConstraint);
    }

    #[test]
    fn test_record_without_transfer() {
        let b = builder(&["Notary"], None);
        let request = ProposalRequest {
            explorer: explorer(),
            record_type: RecordType::Redeem,
            from_holder: "Alice".into(),
            to_holder: "Bank".into(),
            quantity: 3,
            transfer: None,
        };
        let bundle = b.build(&request, Utc::now()).unwrap();
        assert_eq!(bundle.outputs().len(), 1);
        assert_eq!(bundle.commands().len(), 1);
    }
}

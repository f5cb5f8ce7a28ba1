//! # Failure Scenarios
//!
//! Each failure surfaces at the initiator with one error kind, and no store
//! on any node records a bundle that did not reach consensus.

#[cfg(test)]
mod tests {
    use crate::harness::{eventually, NodeOptions, TestNetwork};
    use chrono::Utc;
    use shared_types::Party;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tr_01_record_contract::{
        BundleBuilder, Command, CommandData, ExternalState, LedgerState, ProposalBundle,
        RecordEntity, RecordType, StateAndRef, StateRef,
    };
    use tr_02_ledger_store::LedgerStore;
    use tr_03_record_flows::{
        ErrorKind, FlowError, FungibleToken, ProposalCheck, RecordFlowApi, RecordFlowConfig,
        FUNGIBLE_TOKEN_CONTRACT,
    };

    const LIMIT: Duration = Duration::from_secs(10);

    struct RejectAll;

    impl ProposalCheck for RejectAll {
        fn check(&self, _bundle: &ProposalBundle, _initiator: &Party) -> Result<(), String> {
            Err("explorer policy refuses this issuer".to_string())
        }
    }

    fn short_timeouts(session: u64, consensus: u64) -> NodeOptions {
        let defaults = NodeOptions::default();
        NodeOptions {
            config: RecordFlowConfig {
                session_timeout: Duration::from_millis(session),
                consensus_timeout: Duration::from_millis(consensus),
                ..defaults.config
            },
            ..defaults
        }
    }

    fn record(
        explorer: &Party,
        record_type: RecordType,
        from: &str,
        to: &str,
        quantity: i64,
    ) -> RecordEntity {
        RecordEntity::new(
            explorer.clone(),
            Utc::now(),
            record_type,
            from,
            to,
            quantity,
        )
        .unwrap()
    }

    /// Spend `token` from its holder to `to`, recorded as a MOVE.
    fn move_bundle(
        notary: &Party,
        token: &StateAndRef,
        from: &Party,
        to: &Party,
        explorer: &Party,
        quantity: i64,
    ) -> ProposalBundle {
        let moved = FungibleToken {
            token_type: "USD".into(),
            fraction_digits: 2,
            issuer: from.clone(),
            holder: to.clone(),
            amount: quantity * 100,
        };
        let mut builder = BundleBuilder::new(notary.clone());
        builder
            .add_input(token.clone())
            .add_output(LedgerState::External(ExternalState {
                contract: FUNGIBLE_TOKEN_CONTRACT.into(),
                participants: vec![to.clone()],
                data: bincode::serialize(&moved).unwrap(),
            }))
            .add_command(Command::new(
                CommandData::External {
                    contract: FUNGIBLE_TOKEN_CONTRACT.into(),
                    name: "MoveTokenCommand".into(),
                },
                [from.owning_key],
            ))
            .add_output(LedgerState::Record(record(
                explorer,
                RecordType::Move,
                &from.name,
                &to.name,
                quantity,
            )))
            .add_command(Command::create_record([explorer.owning_key]));
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_offline_explorer_times_out() {
        let net = TestNetwork::new();
        let bank = net.create_node_with("Bank", short_timeouts(200, 5_000));
        let alice = net.create_party_node("Alice");
        let explorer = net.create_offline_party("Explorer");

        let err = timeout(LIMIT, bank.service.issue_with_record(alice.party(), 100, &explorer))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkTimeout);
        assert_eq!(net.notary.committed_count(), 0);
        assert_eq!(bank.store.transaction_count(), 0);
        // Alice was told to stop waiting and stored nothing.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(alice.store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_explorer_refusal_is_counterparty_rejection() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let explorer = net.create_node_with(
            "Explorer",
            NodeOptions {
                check: Arc::new(RejectAll),
                ..NodeOptions::default()
            },
        );

        let err = timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 100, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CounterpartyRejection);
        match &err {
            FlowError::CounterpartyRejection { party, reason } => {
                assert_eq!(party, "Explorer");
                assert!(reason.contains("explorer policy"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(net.notary.committed_count(), 0);
        for node in [&bank, &alice, &explorer] {
            assert_eq!(node.store.transaction_count(), 0, "{}", node.party());
        }
    }

    #[tokio::test]
    async fn test_move_signed_only_by_holder_is_unauthorized() {
        let net = TestNetwork::new();
        let alice = net.create_party_node("Alice");
        let explorer = net.create_party_node("Explorer");

        let mut builder = BundleBuilder::new(net.notary.party().clone());
        builder
            .add_output(LedgerState::Record(record(
                explorer.party(),
                RecordType::Move,
                "Alice",
                "Bob",
                10,
            )))
            .add_command(Command::create_record([alice.party().owning_key]));
        let bundle = builder.build().unwrap();

        let err = alice.coordinator().run(bundle).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("explorer must sign"));
        assert_eq!(net.network.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_record_as_input_is_a_shape_error() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let explorer = net.create_party_node("Explorer");

        let existing = StateAndRef {
            state: LedgerState::Record(record(
                explorer.party(),
                RecordType::Issue,
                "Bank",
                "Alice",
                5,
            )),
            reference: StateRef {
                tx_id: [7u8; 32],
                index: 0,
            },
        };
        let mut builder = BundleBuilder::new(net.notary.party().clone());
        builder
            .add_input(existing)
            .add_output(LedgerState::Record(record(
                explorer.party(),
                RecordType::Redeem,
                "Alice",
                "Bank",
                5,
            )))
            .add_command(Command::create_record([explorer.party().owning_key]));
        let bundle = builder.build().unwrap();

        let err = bank.coordinator().run(bundle).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProposalShape);
        assert!(err.to_string().contains("records cannot be consumed"));
        assert_eq!(net.network.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_double_spend_is_a_consensus_conflict() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let bob = net.create_party_node("Bob");
        let carol = net.create_party_node("Carol");
        let explorer = net.create_party_node("Explorer");

        timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 100, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap();
        let (token, _) = alice.tokens().remove(0);
        let notary = net.notary.party();

        let to_bob = move_bundle(notary, &token, alice.party(), bob.party(), explorer.party(), 100);
        timeout(LIMIT, alice.coordinator().run(to_bob))
            .await
            .unwrap()
            .unwrap();
        assert!(alice.store.is_consumed(&token.reference));
        assert_eq!(bob.tokens().len(), 1);

        let to_carol =
            move_bundle(notary, &token, alice.party(), carol.party(), explorer.party(), 100);
        let err = timeout(LIMIT, alice.coordinator().run(to_carol))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConsensusConflict);
        match err {
            FlowError::ConsensusConflict { refs } => assert_eq!(refs, vec![token.reference]),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(net.notary.committed_count(), 2);
        assert!(carol.tokens().is_empty());
        assert!(
            eventually(Duration::from_secs(1), || carol.store.transaction_count() == 0).await
        );
        assert_eq!(explorer.store.vault_records().len(), 2);
    }

    #[tokio::test]
    async fn test_slow_consensus_times_out_without_commit() {
        let net = TestNetwork::with_notary_latency(Duration::from_millis(500));
        let bank = net.create_node_with("Bank", short_timeouts(5_000, 50));
        let alice = net.create_party_node("Alice");
        let explorer = net.create_party_node("Explorer");

        let err = timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 100, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkTimeout);

        // The abandoned submission never commits.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(net.notary.committed_count(), 0);
        for node in [&bank, &alice, &explorer] {
            assert_eq!(node.store.transaction_count(), 0, "{}", node.party());
        }
    }
}

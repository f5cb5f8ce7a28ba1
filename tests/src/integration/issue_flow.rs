//! # Issue-With-Record Flow
//!
//! Bank issues fiat tokens to a holder and records the issuance with the
//! explorer's counter-signature. Every party ends up with the finalized
//! bundle; the record lands in the explorer's vault and the tokens in the
//! holder's.

#[cfg(test)]
mod tests {
    use crate::harness::TestNetwork;
    use futures::future::join_all;
    use std::time::Duration;
    use tokio::time::timeout;
    use tr_01_record_contract::RecordType;
    use tr_02_ledger_store::LedgerStore;
    use tr_03_record_flows::RecordFlowApi;

    const LIMIT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_issue_reaches_bank_alice_and_explorer() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let explorer = net.create_party_node("Explorer");

        let finalized = timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 100, explorer.party()),
        )
        .await
        .expect("flow timed out")
        .expect("issue failed");

        let tx_id = finalized.tx_id();
        for node in [&bank, &alice, &explorer] {
            assert!(
                node.store.transaction(&tx_id).is_some(),
                "{} is missing the bundle",
                node.party()
            );
            let records = node.store.recorded_records();
            assert_eq!(records.len(), 1, "{}", node.party());
            let record = &records[0];
            assert_eq!(record.record_type(), RecordType::Issue);
            assert_eq!(record.quantity(), 100);
            assert_eq!(record.from_holder(), "Bank");
            assert_eq!(record.to_holder(), "Alice");
            assert_eq!(record.explorer(), explorer.party());
        }

        // Vault relevance: the record belongs to the explorer only.
        assert_eq!(explorer.store.vault_records().len(), 1);
        assert!(alice.store.vault_records().is_empty());
        assert!(bank.store.vault_records().is_empty());

        // 100 USD at two fraction digits.
        let tokens = alice.tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].1.amount, 10_000);
        assert_eq!(tokens[0].1.issuer, *bank.party());
        assert!(bank.tokens().is_empty());
        assert!(explorer.tokens().is_empty());

        assert_eq!(net.notary.committed_count(), 1);
    }

    #[tokio::test]
    async fn test_bundle_carries_explorer_and_notary_signatures() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let explorer = net.create_party_node("Explorer");

        let finalized = timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 5, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap();

        let signers = finalized.signed().signers();
        assert!(signers.contains(&bank.party().owning_key));
        assert!(signers.contains(&explorer.party().owning_key));
        // The holder observes finality without signing.
        assert!(!signers.contains(&alice.party().owning_key));
        assert_eq!(finalized.notary_signature().by, net.notary.party().owning_key);
        assert!(finalized.verify().is_ok());
    }

    #[tokio::test]
    async fn test_x500_names_are_carried_verbatim() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("O=Bank,L=London,C=GB");
        let alice = net.create_party_node("O=Alice,L=New York,C=US");
        let explorer = net.create_party_node("O=Explorer,L=Zurich,C=CH");

        timeout(
            LIMIT,
            bank.service
                .issue_with_record(alice.party(), 7, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap();

        let record = &explorer.store.vault_records()[0];
        assert_eq!(record.from_holder(), "O=Bank,L=London,C=GB");
        assert_eq!(record.to_holder(), "O=Alice,L=New York,C=US");
    }

    #[tokio::test]
    async fn test_concurrent_proposals_from_one_initiator() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let bob = net.create_party_node("Bob");
        let explorer = net.create_party_node("Explorer");

        let proposals = (1..=4)
            .map(|q| bank.service.issue_with_record(alice.party(), q, explorer.party()))
            .chain(
                (1..=4).map(|q| bank.service.issue_with_record(bob.party(), q * 10, explorer.party())),
            );
        let results = timeout(LIMIT, join_all(proposals)).await.unwrap();

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(net.notary.committed_count(), 8);
        assert_eq!(explorer.store.vault_records().len(), 8);
        assert_eq!(bank.store.transaction_count(), 8);
        assert_eq!(alice.tokens().len(), 4);
        assert_eq!(bob.tokens().len(), 4);
        // Alice only sees the bundles she participates in.
        assert_eq!(alice.store.transaction_count(), 4);
    }

    #[tokio::test]
    async fn test_explorer_can_also_be_the_issuer() {
        let net = TestNetwork::new();
        let explorer = net.create_party_node("Explorer");
        let alice = net.create_party_node("Alice");

        timeout(
            LIMIT,
            explorer
                .service
                .issue_with_record(alice.party(), 12, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(explorer.store.vault_records().len(), 1);
        assert_eq!(alice.record_count(), 1);
    }
}

//! # Record Queries
//!
//! Queries run over the explorer's vault projections.

#[cfg(test)]
mod tests {
    use crate::harness::TestNetwork;
    use std::time::Duration;
    use tokio::time::timeout;
    use tr_01_record_contract::{RecordField, RecordType};
    use tr_02_ledger_store::{LedgerStore, RecordQuery, SortDirection};
    use tr_03_record_flows::RecordFlowApi;

    #[tokio::test]
    async fn test_average_issued_quantity_by_holder() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let bob = net.create_party_node("Bob");
        let explorer = net.create_party_node("Explorer");

        let issues = [(&alice, 50), (&alice, 75), (&alice, 100), (&bob, 30), (&bob, 60)];
        for (holder, quantity) in issues {
            timeout(
                Duration::from_secs(10),
                bank.service
                    .issue_with_record(holder.party(), quantity, explorer.party()),
            )
            .await
            .unwrap()
            .unwrap();
        }

        let averages = explorer.store.average_quantity(
            &RecordQuery::new().with_type(RecordType::Issue),
            RecordField::ToHolder,
            SortDirection::Desc,
        );
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].group, "Alice");
        assert_eq!(averages[0].average, 75.0);
        assert_eq!(averages[0].count, 3);
        assert_eq!(averages[1].group, "Bob");
        assert_eq!(averages[1].average, 45.0);
        assert_eq!(averages[1].count, 2);

        let ascending = explorer.store.average_quantity(
            &RecordQuery::new().with_type(RecordType::Issue),
            RecordField::ToHolder,
            SortDirection::Asc,
        );
        assert_eq!(ascending[0].group, "Bob");

        // No MOVE records were made.
        assert!(explorer
            .store
            .average_quantity(
                &RecordQuery::new().with_type(RecordType::Move),
                RecordField::ToHolder,
                SortDirection::Desc,
            )
            .is_empty());

        // Holders do not keep records in their vaults.
        assert!(alice
            .store
            .query_records(&RecordQuery::new())
            .is_empty());
    }

    #[tokio::test]
    async fn test_projection_maps_back_through_directory() {
        let net = TestNetwork::new();
        let bank = net.create_party_node("Bank");
        let alice = net.create_party_node("Alice");
        let explorer = net.create_party_node("Explorer");

        timeout(
            Duration::from_secs(10),
            bank.service
                .issue_with_record(alice.party(), 42, explorer.party()),
        )
        .await
        .unwrap()
        .unwrap();

        let rows = explorer
            .store
            .query_records(&RecordQuery::new().with_to_holder("Alice"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record_type, "ISSUE");
        assert_eq!(rows[0].explorer, "Explorer");

        let entity = rows[0].to_entity(net.directory.as_ref()).unwrap();
        assert_eq!(entity, explorer.store.vault_records()[0]);
    }
}

#[cfg(test)]
mod tests_snapshot_restore {
    use orderbook_graph::orderbook::GRAPH_SNAPSHOT_FORMAT_VERSION;
    use orderbook_graph::{
        AccountId, Asset, Graph, GraphError, GraphSnapshotPackage, LiquidityPool, Offer, OfferId,
        Price,
    };

    fn usd() -> Asset {
        Asset::issued("USD", "GISSUER")
    }

    fn eur() -> Asset {
        Asset::issued("EUR", "GISSUER")
    }

    fn populate_graph(graph: &Graph) {
        let seller = AccountId::new("GSELLER");
        graph.add_offer(Offer::new(
            1,
            seller.clone(),
            Asset::Native,
            usd(),
            500,
            Price::new(1, 4),
        ));
        graph.add_offer(Offer::new(
            2,
            seller.clone(),
            usd(),
            eur(),
            300,
            Price::new(3, 1),
        ));
        graph.add_offer(Offer::new(3, seller, eur(), Asset::Native, 50, Price::new(2, 1)));
        graph.add_liquidity_pool(LiquidityPool::new(Asset::Native, eur(), 10_000, 2_500, 30));
        graph.apply(42).expect("apply");
    }

    #[test]
    fn snapshot_package_round_trip_restores_the_graph() {
        let original = Graph::new();
        populate_graph(&original);

        let package = original.snapshot_package().expect("snapshot package");
        assert_eq!(package.version, GRAPH_SNAPSHOT_FORMAT_VERSION);
        assert_eq!(package.checksum.len(), 64);

        let restored = Graph::new();
        restored
            .restore_from_snapshot_package(package)
            .expect("restore from package");

        assert_eq!(restored.last_applied_ledger(), 42);
        assert_eq!(restored.offers(), original.offers());
        assert_eq!(restored.liquidity_pools(), original.liquidity_pools());
        assert_eq!(
            restored.find_asks_and_bids(&Asset::Native, &usd(), 5),
            original.find_asks_and_bids(&Asset::Native, &usd(), 5)
        );
        assert!(restored.verify().is_ok());
    }

    #[test]
    fn json_round_trip_and_ledgers_continue() {
        let original = Graph::new();
        populate_graph(&original);
        let json = original.snapshot_to_json().expect("json");

        let restored = Graph::new();
        restored.restore_from_snapshot_json(&json).expect("restore");
        assert_eq!(restored.snapshot(), original.snapshot());

        assert!(matches!(
            restored.apply(42),
            Err(GraphError::UnexpectedLedger { .. })
        ));
        restored.remove_offer(OfferId(1));
        restored.apply(43).expect("next ledger");
        assert_eq!(restored.offer_count(), 2);
    }

    #[test]
    fn restore_replaces_existing_state_and_pending_work() {
        let source = Graph::new();
        populate_graph(&source);
        let snapshot = source.snapshot();

        let target = Graph::new();
        target.add_offer(Offer::new(
            99,
            AccountId::new("GOTHER"),
            usd(),
            Asset::Native,
            1,
            Price::new(1, 1),
        ));
        target.apply(7).expect("apply");
        target.add_offer(Offer::new(
            100,
            AccountId::new("GOTHER"),
            usd(),
            Asset::Native,
            1,
            Price::new(1, 1),
        ));

        target.restore_from_snapshot(snapshot).expect("restore");
        assert_eq!(target.pending_len(), 0);
        assert!(!target.offers_map().contains_key(&OfferId(99)));
        assert_eq!(target.offers(), source.offers());
    }

    #[test]
    fn tampered_package_is_rejected() {
        let original = Graph::new();
        populate_graph(&original);
        let mut package = original.snapshot_package().expect("package");
        package.snapshot.offers[0].amount += 1;

        let target = Graph::new();
        let result = target.restore_from_snapshot_package(package);
        assert!(matches!(result, Err(GraphError::ChecksumMismatch { .. })));
        assert!(target.is_empty());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let original = Graph::new();
        populate_graph(&original);
        let mut package = original.snapshot_package().expect("package");
        package.version = GRAPH_SNAPSHOT_FORMAT_VERSION + 1;

        assert_eq!(
            package.validate(),
            Err(GraphError::UnsupportedSnapshotVersion {
                found: GRAPH_SNAPSHOT_FORMAT_VERSION + 1,
                expected: GRAPH_SNAPSHOT_FORMAT_VERSION,
            })
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        let graph = Graph::new();
        let result = graph.restore_from_snapshot_json("{ not json");
        assert!(matches!(
            result,
            Err(GraphError::DeserializationError { .. })
        ));
    }

    #[test]
    fn invalid_offer_in_snapshot_leaves_graph_untouched() {
        let original = Graph::new();
        populate_graph(&original);
        let mut snapshot = original.snapshot();
        snapshot.offers[0].price = Price::new(0, 1);

        let target = Graph::new();
        populate_graph(&target);
        let before = target.snapshot();

        assert!(matches!(
            target.restore_from_snapshot(snapshot),
            Err(GraphError::InvalidOffer { .. })
        ));
        assert_eq!(target.snapshot(), before);
        let package = GraphSnapshotPackage::new(before).expect("package");
        assert!(package.validate().is_ok());
    }
}

#[cfg(test)]
mod tests_path_scenarios {
    use orderbook_graph::{
        AccountId, Asset, FinderConfig, Graph, GraphError, InMemoryFinder, LiquidityPool, Offer,
        Path, PathFinder, PathQuery, PathSearchError, Price, SearchCancellation,
    };
    use std::sync::Arc;

    fn usd() -> Asset {
        Asset::issued("USD", "GISSUER")
    }

    fn eur() -> Asset {
        Asset::issued("EUR", "GISSUER")
    }

    fn offer(id: i64, selling: Asset, buying: Asset, amount: i64, n: i32, d: i32) -> Offer {
        Offer::new(
            id,
            AccountId::new("GMARKETMAKER"),
            selling,
            buying,
            amount,
            Price::new(n, d),
        )
    }

    /// 1 native costs 1/4 usd, 1 usd costs 3 eur
    fn chain_graph() -> Arc<Graph> {
        let graph = Graph::new();
        graph.add_offer(offer(1, Asset::Native, usd(), 1_000, 1, 4));
        graph.add_offer(offer(2, usd(), eur(), 1_000, 3, 1));
        graph.apply(100).expect("apply");
        Arc::new(graph)
    }

    fn query(amount: i64, sources: Vec<Asset>) -> PathQuery {
        PathQuery {
            destination_asset: Asset::Native,
            destination_amount: amount,
            source_account: None,
            source_assets: sources,
            source_asset_balances: Vec::new(),
            validate_source_balance: false,
        }
    }

    fn sources(paths: &[Path]) -> Vec<(Asset, i64, usize)> {
        paths
            .iter()
            .map(|path| {
                (
                    path.source_asset.clone(),
                    path.source_amount,
                    path.interior_nodes.len(),
                )
            })
            .collect()
    }

    #[test]
    fn asks_come_back_cheapest_first() {
        let graph = Graph::new();
        graph.add_offer(offer(3, Asset::Native, usd(), 10, 1, 1));
        graph.add_offer(offer(1, Asset::Native, usd(), 10, 1, 4));
        graph.add_offer(offer(2, Asset::Native, usd(), 10, 1, 2));
        graph.apply(1).expect("apply");

        let (asks, bids, ledger) = graph.find_asks_and_bids(&Asset::Native, &usd(), 3);
        let prices: Vec<Price> = asks.iter().map(|offer| offer.price).collect();
        assert_eq!(
            prices,
            vec![Price::new(1, 4), Price::new(1, 2), Price::new(1, 1)]
        );
        assert!(bids.is_empty());
        assert_eq!(ledger, 1);
    }

    #[test]
    fn ledgers_are_applied_in_order() {
        let graph = Graph::new();
        graph.apply(2).expect("fresh graph accepts any positive ledger");
        assert_eq!(graph.last_applied_ledger(), 2);

        for stale in [1, 2] {
            assert!(matches!(
                graph.apply(stale),
                Err(GraphError::UnexpectedLedger {
                    last_applied: 2,
                    ..
                })
            ));
            assert_eq!(graph.last_applied_ledger(), 2);
        }
    }

    #[test]
    fn two_hop_chain_to_fixed_destination() {
        let finder = InMemoryFinder::new(chain_graph(), FinderConfig::default());
        let (paths, ledger) = finder
            .find(&SearchCancellation::new(), &query(20, vec![usd(), eur()]), 2)
            .expect("search");

        assert_eq!(ledger, 100);
        assert_eq!(sources(&paths), vec![(eur(), 15, 1), (usd(), 5, 0)]);
        assert_eq!(paths[0].interior_nodes, vec![usd()]);
        assert!(paths.iter().all(|path| path.destination_asset == Asset::Native));
        assert!(paths.iter().all(|path| path.destination_amount == 20));
    }

    #[test]
    fn two_hop_chain_from_fixed_source() {
        let finder = InMemoryFinder::new(chain_graph(), FinderConfig::default());
        let (paths, _) = finder
            .find_fixed_paths(
                &SearchCancellation::new(),
                &eur(),
                15,
                &[Asset::Native, usd()],
                2,
            )
            .expect("search");

        let destinations: Vec<(Asset, i64)> = paths
            .iter()
            .map(|path| (path.destination_asset.clone(), path.destination_amount))
            .collect();
        assert_eq!(destinations, vec![(usd(), 5), (Asset::Native, 20)]);
        assert!(paths.iter().all(|path| path.source_amount == 15));
    }

    #[test]
    fn payer_offers_are_ignored() {
        let graph = Graph::new();
        graph.add_offer(Offer::new(
            1,
            AccountId::new("GPAYER"),
            Asset::Native,
            usd(),
            1_000,
            Price::new(1, 4),
        ));
        graph.add_offer(offer(2, Asset::Native, usd(), 1_000, 1, 1));
        graph.apply(1).expect("apply");

        let finder = InMemoryFinder::new(Arc::new(graph), FinderConfig::default());
        let mut request = query(20, vec![usd()]);
        let (paths, _) = finder
            .find(&SearchCancellation::new(), &request, 1)
            .expect("search");
        assert_eq!(paths[0].source_amount, 5);

        request.source_account = Some(AccountId::new("GPAYER"));
        let (paths, _) = finder
            .find(&SearchCancellation::new(), &request, 1)
            .expect("search");
        assert_eq!(paths[0].source_amount, 20);
    }

    #[test]
    fn pool_is_used_unless_disabled() {
        let graph = Graph::new();
        graph.add_liquidity_pool(LiquidityPool::new(Asset::Native, usd(), 1000, 1000, 30));
        graph.apply(1).expect("apply");
        let graph = Arc::new(graph);

        let with_pools = InMemoryFinder::new(Arc::clone(&graph), FinderConfig::default());
        let (paths, _) = with_pools
            .find(&SearchCancellation::new(), &query(332, vec![usd()]), 1)
            .expect("search");
        assert_eq!(sources(&paths), vec![(usd(), 499, 0)]);

        let without_pools = InMemoryFinder::new(graph, FinderConfig::new().with_pools(false));
        let (paths, _) = without_pools
            .find(&SearchCancellation::new(), &query(332, vec![usd()]), 1)
            .expect("search");
        assert!(paths.is_empty());
    }

    #[test]
    fn requests_are_checked_against_the_config() {
        let finder = InMemoryFinder::new(chain_graph(), FinderConfig::default());
        let cancellation = SearchCancellation::new();

        assert_eq!(
            finder.find(&cancellation, &query(20, vec![usd()]), 4),
            Err(PathSearchError::PathTooLong {
                requested: 4,
                max: 3,
            })
        );
        assert_eq!(
            finder.find(&cancellation, &query(20, Vec::new()), 2),
            Err(PathSearchError::NoCandidateAssets)
        );

        let many: Vec<Asset> = (0..16)
            .map(|i| Asset::issued(format!("T{i}"), "GISSUER"))
            .collect();
        assert_eq!(
            finder.find(&cancellation, &query(20, many), 2),
            Err(PathSearchError::TooManyAssets {
                requested: 16,
                max: 15,
            })
        );
        assert_eq!(
            finder.find(&cancellation, &query(-5, vec![usd()]), 2),
            Err(PathSearchError::NonPositiveAmount(-5))
        );
    }

    #[test]
    fn restored_graph_finds_the_same_paths() {
        let original = chain_graph();
        let json = original.snapshot_to_json().expect("snapshot");

        let restored = Graph::new();
        restored.restore_from_snapshot_json(&json).expect("restore");
        let restored = Arc::new(restored);

        let request = query(20, vec![usd(), eur()]);
        let cancellation = SearchCancellation::new();
        let before = InMemoryFinder::new(original, FinderConfig::default())
            .find(&cancellation, &request, 2)
            .expect("search");
        let after = InMemoryFinder::new(restored, FinderConfig::default())
            .find(&cancellation, &request, 2)
            .expect("search");
        assert_eq!(before, after);
    }
}

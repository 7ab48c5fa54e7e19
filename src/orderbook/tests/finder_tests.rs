//! Tests for the query-level path finder

#[cfg(test)]
mod tests {
    use crate::orderbook::tests::test_helpers::{eur, graph_with, offer, usd};
    use crate::orderbook::{
        AccountId, Asset, FinderConfig, InMemoryFinder, PathFinder, PathQuery, PathSearchError,
        SearchCancellation,
    };
    use std::sync::Arc;

    fn finder(config: FinderConfig) -> InMemoryFinder {
        let graph = graph_with(
            vec![
                offer(1, Asset::Native, usd(), 100, 1, 4),
                offer(2, usd(), eur(), 100, 3, 1),
            ],
            21,
        );
        InMemoryFinder::new(Arc::new(graph), config)
    }

    fn query(sources: Vec<Asset>) -> PathQuery {
        PathQuery {
            destination_asset: Asset::Native,
            destination_amount: 20,
            source_account: None,
            source_assets: sources,
            source_asset_balances: vec![],
            validate_source_balance: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = FinderConfig::default();
        assert_eq!(config.max_path_length, 3);
        assert_eq!(config.max_assets_per_request, 15);
        assert_eq!(config.max_paths_per_asset, 5);
        assert!(config.include_pools);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FinderConfig =
            serde_json::from_str(r#"{"max_path_length": 4, "include_pools": false}"#)
                .expect("config");
        assert_eq!(
            config,
            FinderConfig::new().with_max_path_length(4).with_pools(false)
        );
    }

    #[test]
    fn test_find_delegates_to_the_graph() {
        let finder = finder(FinderConfig::default());
        let (paths, ledger) = finder
            .find(&SearchCancellation::new(), &query(vec![usd(), eur()]), 3)
            .expect("find");

        assert_eq!(ledger, 21);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].source_amount, 5);
    }

    #[test]
    fn test_source_account_offers_are_ignored() {
        let finder = finder(FinderConfig::default());
        let mut query = query(vec![usd()]);
        query.source_account = Some(AccountId::new("GSELLER"));

        let (paths, _) = finder
            .find(&SearchCancellation::new(), &query, 3)
            .expect("find");
        assert!(paths.is_empty());
    }

    #[test]
    fn test_query_limits() {
        let finder = finder(FinderConfig::default().with_max_assets_per_request(1));
        let cancellation = SearchCancellation::new();

        assert_eq!(
            finder.find(&cancellation, &query(vec![usd()]), 4),
            Err(PathSearchError::PathTooLong {
                requested: 4,
                max: 3,
            })
        );
        assert_eq!(
            finder.find(&cancellation, &query(vec![usd(), eur()]), 2),
            Err(PathSearchError::TooManyAssets {
                requested: 2,
                max: 1,
            })
        );
        assert_eq!(
            finder.find(&cancellation, &query(vec![]), 2),
            Err(PathSearchError::NoCandidateAssets)
        );

        let mut negative = query(vec![usd()]);
        negative.destination_amount = -5;
        assert_eq!(
            finder.find(&cancellation, &negative, 2),
            Err(PathSearchError::NonPositiveAmount(-5))
        );
    }

    #[test]
    fn test_fixed_paths() {
        let finder = finder(FinderConfig::default().with_max_paths_per_asset(1));
        let (paths, _) = finder
            .find_fixed_paths(&SearchCancellation::new(), &eur(), 30, &[Asset::Native], 2)
            .expect("find");

        // 30 eur buys 10 usd, which buys 40 native
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].destination_amount, 40);
        assert_eq!(paths[0].interior_nodes, vec![usd()]);
        assert_eq!(finder.config().max_paths_per_asset, 1);
        assert_eq!(finder.graph().last_applied_ledger(), 21);
    }
}

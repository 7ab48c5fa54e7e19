#[cfg(test)]
mod tests_graph_properties {
    use orderbook_graph::{AccountId, Asset, Graph, Offer, OfferId, Price};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    enum Op {
        Add {
            id: i64,
            pair: usize,
            amount: i64,
            n: i32,
            d: i32,
        },
        Remove(i64),
    }

    fn assets() -> Vec<Asset> {
        vec![
            Asset::Native,
            Asset::issued("USD", "GISSUER"),
            Asset::issued("EUR", "GISSUER"),
        ]
    }

    fn pair(index: usize) -> (Asset, Asset) {
        let assets = assets();
        let pairs = [(0, 1), (1, 0), (1, 2), (2, 1), (0, 2), (2, 0)];
        let (s, b) = pairs[index % pairs.len()];
        (assets[s].clone(), assets[b].clone())
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i64..20, 0usize..6, 1i64..1_000, 1i32..10, 1i32..10).prop_map(
                |(id, pair, amount, n, d)| Op::Add {
                    id,
                    pair,
                    amount,
                    n,
                    d,
                }
            ),
            1 => (0i64..20).prop_map(Op::Remove),
        ]
    }

    fn to_offer(id: i64, pair_index: usize, amount: i64, n: i32, d: i32) -> Offer {
        let (selling, buying) = pair(pair_index);
        Offer::new(
            id,
            AccountId::new("GSELLER"),
            selling,
            buying,
            amount,
            Price::new(n, d),
        )
    }

    proptest! {
        #[test]
        fn indexes_stay_mirrored_and_sorted(
            batches in prop::collection::vec(prop::collection::vec(op_strategy(), 0..12), 1..8)
        ) {
            let graph = Graph::new();
            let mut model: BTreeMap<i64, Offer> = BTreeMap::new();

            for (ledger, batch) in batches.iter().enumerate() {
                for op in batch {
                    match op {
                        Op::Add { id, pair, amount, n, d } => {
                            let offer = to_offer(*id, *pair, *amount, *n, *d);
                            model.insert(*id, offer.clone());
                            graph.add_offer(offer);
                        }
                        Op::Remove(id) => {
                            model.remove(id);
                            graph.remove_offer(OfferId(*id));
                        }
                    }
                }
                graph.apply(ledger as u32 + 1).expect("ledgers increase");

                let (offers, pools) = graph.verify().expect("consistent indexes");
                prop_assert!(pools.is_empty());
                let expected: Vec<Offer> = model.values().cloned().collect();
                prop_assert_eq!(offers, expected);

                for index in 0..6 {
                    let (selling, buying) = pair(index);
                    let (asks, _, _) = graph.find_asks_and_bids(&selling, &buying, usize::MAX);
                    for window in asks.windows(2) {
                        prop_assert!(!window[1].price.cheaper(&window[0].price));
                    }
                    let expected_count = model
                        .values()
                        .filter(|offer| offer.selling == selling && offer.buying == buying)
                        .count();
                    prop_assert_eq!(asks.len(), expected_count);
                }
            }
        }

        #[test]
        fn add_then_remove_restores_previous_state(
            base in prop::collection::vec((0i64..10, 0usize..6, 1i64..100, 1i32..5, 1i32..5), 0..10),
            extra in (100i64..200, 0usize..6, 1i64..100, 1i32..5, 1i32..5),
        ) {
            let graph = Graph::new();
            for (id, pair, amount, n, d) in &base {
                graph.add_offer(to_offer(*id, *pair, *amount, *n, *d));
            }
            graph.apply(1).expect("apply");
            let before = graph.snapshot();

            let (id, pair, amount, n, d) = extra;
            graph.add_offer(to_offer(id, pair, amount, n, d));
            graph.remove_offer(OfferId(id));
            graph.apply(2).expect("apply");

            let after = graph.snapshot();
            prop_assert_eq!(after.offers, before.offers);
            prop_assert!(graph.verify().is_ok());
        }
    }
}

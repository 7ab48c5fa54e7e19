#[cfg(test)]
mod tests_concurrency {
    use orderbook_graph::{
        AccountId, Asset, Graph, Offer, OfferId, Price, SearchCancellation, SearchFlags,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    const LEDGERS: u32 = 200;

    fn usd() -> Asset {
        Asset::issued("USD", "GISSUER")
    }

    fn offer(id: i64) -> Offer {
        Offer::new(
            id,
            AccountId::new("GSELLER"),
            Asset::Native,
            usd(),
            1_000,
            Price::new(1, 2),
        )
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn readers_only_observe_whole_ledgers() {
        init_logging();
        let graph = Arc::new(Graph::new());
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let graph = Arc::clone(&graph);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut last_seen = 0;
                    while !done.load(Ordering::Acquire) {
                        let (asks, _, ledger) =
                            graph.find_asks_and_bids(&Asset::Native, &usd(), 10);
                        assert!(ledger >= last_seen, "ledger went backwards");
                        last_seen = ledger;
                        // every batch swaps one offer for the next
                        if ledger == 0 {
                            assert!(asks.is_empty());
                        } else {
                            assert_eq!(asks.len(), 1);
                            assert_eq!(asks[0].id, OfferId(i64::from(ledger)));
                        }

                        let (paths, _) = graph
                            .find_paths(
                                &SearchCancellation::new(),
                                2,
                                &Asset::Native,
                                100,
                                None,
                                &[usd()],
                                &[],
                                SearchFlags::default(),
                                5,
                            )
                            .expect("search");
                        assert!(paths.len() <= 1);
                    }
                    last_seen
                })
            })
            .collect();

        for ledger in 1..=LEDGERS {
            let id = i64::from(ledger);
            graph.add_offer(offer(id));
            graph.remove_offer(OfferId(id - 1));
            graph.apply(ledger).expect("apply");
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            let last_seen = reader.join().expect("reader panicked");
            assert!(last_seen <= LEDGERS);
        }
        assert_eq!(graph.offer_count(), 1);
        assert!(graph.verify().is_ok());
    }

    #[test]
    fn staging_from_many_threads_lands_in_one_batch() {
        let graph = Arc::new(Graph::new());
        let writers: Vec<_> = (0..8)
            .map(|worker: i64| {
                let graph = Arc::clone(&graph);
                thread::spawn(move || {
                    for i in 0..25 {
                        graph.add_offer(offer(worker * 100 + i));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer panicked");
        }

        assert!(graph.is_empty());
        assert_eq!(graph.pending_len(), 200);
        graph.apply(1).expect("apply");
        assert_eq!(graph.offer_count(), 200);
        assert!(graph.verify().is_ok());
    }
}

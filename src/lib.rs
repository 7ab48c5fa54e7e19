//! # In-Memory Order Book Graph and Payment Path Finder
//!
//! A live, queryable model of every standing offer and constant-product
//! liquidity pool on a ledger-based exchange, together with a bounded
//! multi-hop search answering payment-routing queries such as "what is the
//! cheapest way to deliver 100 EUR if I hold USD or the native asset?".
//!
//! ## Key Features
//!
//! - **Mirrored Indexes**: every offer is indexed both by the asset it sells
//!   and by the asset it buys, so a search can walk the graph in either
//!   direction. Both indexes change together or not at all.
//!
//! - **Price-Sorted Venues**: each asset pair keeps its offers sorted from
//!   cheapest to most expensive, with offers at the same price kept in
//!   arrival order, plus at most one liquidity pool.
//!
//! - **Ledger-Atomic Updates**: changes are staged in a [`Batch`] and
//!   committed once per ledger under a single exclusive lock. Ledgers must
//!   move forward; an out-of-order ledger is rejected without touching the
//!   graph.
//!
//! - **Two Search Directions**: fixed destination amount (cheapest source
//!   first) and fixed source amount (largest delivery first), sharing one
//!   relaxation loop with per-path cycle avoidance and last-hop pruning.
//!
//! - **Exact Arithmetic**: offer crossing uses rational prices with explicit
//!   rounding; pool quotes use 256-bit intermediates. Overflow is always
//!   reported, never wrapped.
//!
//! - **Snapshots**: the committed state can be exported to a
//!   checksum-protected JSON package and restored atomically.
//!
//! ## Concurrency
//!
//! Readers (price-level lookups, snapshots, path searches) hold a shared
//! lock for their whole duration and therefore observe one committed
//! ledger. Writers hold the exclusive lock only while replaying a batch. A
//! [`SearchCancellation`] flag aborts a long search from another thread.
//!
//! ## Example
//!
//! ```
//! use orderbook_graph::prelude::*;
//!
//! let graph = Graph::new();
//! let usd = Asset::issued("USD", "GISSUER");
//! let eur = Asset::issued("EUR", "GISSUER");
//! let maker = AccountId::new("GMAKER");
//!
//! // 100 native for USD at 1/4, 100 USD for EUR at 3/1
//! graph.add_offer(Offer::new(1, maker.clone(), Asset::Native, usd.clone(), 100, Price::new(1, 4)));
//! graph.add_offer(Offer::new(2, maker, usd.clone(), eur.clone(), 100, Price::new(3, 1)));
//! graph.apply(1).unwrap();
//!
//! let (paths, ledger) = graph
//!     .find_paths(
//!         &SearchCancellation::new(),
//!         3,
//!         &Asset::Native,
//!         20,
//!         None,
//!         &[usd.clone(), eur.clone()],
//!         &[],
//!         SearchFlags::default(),
//!         5,
//!     )
//!     .unwrap();
//!
//! assert_eq!(ledger, 1);
//! assert_eq!(paths.len(), 2);
//! assert_eq!((paths[0].source_asset.clone(), paths[0].source_amount), (eur, 15));
//! assert_eq!(paths[0].interior_nodes, vec![usd.clone()]);
//! assert_eq!((paths[1].source_asset.clone(), paths[1].source_amount), (usd, 5));
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: records batch commits through the [`metrics`] facade
//!   (`orderbook_graph_batches_applied`, `orderbook_graph_operations_applied`,
//!   `orderbook_graph_offers`, `orderbook_graph_last_ledger`).
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Per-offer detail is logged at `trace`, skipped removals and search
//! summaries at `debug`, commits, clears and restores at `info`, and
//! rejected ledgers at `warn`.

pub mod orderbook;

pub mod prelude;

pub use orderbook::amm::{calculate_pool_expectation, calculate_pool_payout};
pub use orderbook::{
    AccountId, AmmError, Asset, Batch, BatchOperation, FinderConfig, Graph, GraphError,
    GraphSnapshot, GraphSnapshotPackage, InMemoryFinder, LiquidityPool, Offer, OfferId, Path,
    PathFinder, PathQuery, PathSearchError, PoolId, Price, PriceError, SearchCancellation,
    SearchFlags,
};

//! Order book graph: offers and liquidity pools indexed for price lookups and path finding.

/// Constant-product pool quoting.
pub mod amm;
pub mod asset;
/// Staged mutations applied atomically per ledger.
pub mod batch;
pub mod error;
/// Query validation and the path finder interface.
pub mod finder;
pub mod graph;
pub mod interner;
pub mod offer;
pub mod paths;
pub mod pool;
pub mod price;
pub mod search;
pub mod snapshot;
pub mod venues;

mod tests;

pub use amm::{calculate_pool_expectation, calculate_pool_payout};
pub use asset::{AccountId, Asset, NATIVE_ASSET, ParseAssetError};
pub use batch::{Batch, BatchOperation};
pub use error::{AmmError, GraphError, PathSearchError, PriceError};
pub use finder::{FinderConfig, InMemoryFinder, PathFinder, PathQuery};
pub use graph::Graph;
pub use offer::{Offer, OfferId};
pub use paths::{Path, SearchFlags};
pub use pool::{LiquidityPool, MAX_FEE_BPS, PoolId};
pub use price::Price;
pub use search::SearchCancellation;
pub use snapshot::{GRAPH_SNAPSHOT_FORMAT_VERSION, GraphSnapshot, GraphSnapshotPackage};

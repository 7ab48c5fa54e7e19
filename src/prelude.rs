//! Prelude module that re-exports commonly used types and traits.
//!
//! ```rust
//! use orderbook_graph::prelude::*;
//! ```

// Data model
pub use crate::orderbook::asset::{AccountId, Asset};
pub use crate::orderbook::offer::{Offer, OfferId};
pub use crate::orderbook::pool::{LiquidityPool, PoolId};
pub use crate::orderbook::price::Price;

// Graph and staging
pub use crate::orderbook::batch::{Batch, BatchOperation};
pub use crate::orderbook::graph::Graph;
pub use crate::orderbook::snapshot::{GraphSnapshot, GraphSnapshotPackage};

// Path finding
pub use crate::orderbook::finder::{FinderConfig, InMemoryFinder, PathFinder, PathQuery};
pub use crate::orderbook::paths::{Path, SearchFlags};
pub use crate::orderbook::search::SearchCancellation;

// Errors
pub use crate::orderbook::error::{AmmError, GraphError, PathSearchError, PriceError};

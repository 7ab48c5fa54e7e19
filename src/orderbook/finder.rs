//! Query-level entry point for payment path finding.
//!
//! [`PathFinder`] is the interface consumed by the routing layer. The
//! in-memory implementation validates each query against a
//! [`FinderConfig`] before running the search on a shared [`Graph`].

use super::asset::{AccountId, Asset};
use super::error::PathSearchError;
use super::graph::Graph;
use super::paths::{Path, SearchFlags};
use super::search::SearchCancellation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Limits applied to path finding requests.
///
/// Missing fields take their default value when deserialized, so a
/// partial section of a service configuration file is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Longest search allowed, in conversions (default: 3)
    pub max_path_length: usize,
    /// Most candidate assets accepted in one request (default: 15)
    pub max_assets_per_request: usize,
    /// Most paths returned per source or destination asset (default: 5)
    pub max_paths_per_asset: usize,
    /// Whether liquidity pools are quoted (default: true)
    pub include_pools: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_path_length: 3,
            max_assets_per_request: 15,
            max_paths_per_asset: 5,
            include_pools: true,
        }
    }
}

impl FinderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest search allowed.
    #[must_use]
    pub fn with_max_path_length(mut self, max_path_length: usize) -> Self {
        self.max_path_length = max_path_length;
        self
    }

    /// Sets the most candidate assets accepted in one request.
    #[must_use]
    pub fn with_max_assets_per_request(mut self, max_assets_per_request: usize) -> Self {
        self.max_assets_per_request = max_assets_per_request;
        self
    }

    /// Sets the most paths returned per asset.
    #[must_use]
    pub fn with_max_paths_per_asset(mut self, max_paths_per_asset: usize) -> Self {
        self.max_paths_per_asset = max_paths_per_asset;
        self
    }

    /// Enables or disables pool quotes.
    #[must_use]
    pub fn with_pools(mut self, include_pools: bool) -> Self {
        self.include_pools = include_pools;
        self
    }

    fn flags(&self) -> SearchFlags {
        if self.include_pools {
            SearchFlags::INCLUDE_POOLS
        } else {
            SearchFlags::empty()
        }
    }

    fn check_length(&self, requested: usize) -> Result<(), PathSearchError> {
        if requested > self.max_path_length {
            return Err(PathSearchError::PathTooLong {
                requested,
                max: self.max_path_length,
            });
        }
        Ok(())
    }

    fn check_assets(&self, assets: &[Asset]) -> Result<(), PathSearchError> {
        if assets.is_empty() {
            return Err(PathSearchError::NoCandidateAssets);
        }
        if assets.len() > self.max_assets_per_request {
            return Err(PathSearchError::TooManyAssets {
                requested: assets.len(),
                max: self.max_assets_per_request,
            });
        }
        Ok(())
    }
}

/// A request for paths delivering a fixed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    /// Asset the receiver gets
    pub destination_asset: Asset,
    /// Amount the receiver gets
    pub destination_amount: i64,
    /// Account paying; its own offers are not used
    pub source_account: Option<AccountId>,
    /// Assets the payment may be funded with
    pub source_assets: Vec<Asset>,
    /// Balances of `source_assets`, in the same order
    pub source_asset_balances: Vec<i64>,
    /// Only return paths the balances can fund
    pub validate_source_balance: bool,
}

/// Finds payment paths.
pub trait PathFinder {
    /// Returns paths delivering `query.destination_amount`, with at most
    /// `max_length` conversions, and the ledger they were computed at.
    fn find(
        &self,
        cancellation: &SearchCancellation,
        query: &PathQuery,
        max_length: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError>;

    /// Returns paths spending exactly `amount_to_spend` of `source_asset`,
    /// with at most `max_length` conversions, and the ledger they were
    /// computed at.
    fn find_fixed_paths(
        &self,
        cancellation: &SearchCancellation,
        source_asset: &Asset,
        amount_to_spend: i64,
        destination_assets: &[Asset],
        max_length: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError>;
}

/// [`PathFinder`] backed by an in-memory [`Graph`].
#[derive(Debug, Clone)]
pub struct InMemoryFinder {
    graph: Arc<Graph>,
    config: FinderConfig,
}

impl InMemoryFinder {
    pub fn new(graph: Arc<Graph>, config: FinderConfig) -> Self {
        Self { graph, config }
    }

    #[must_use]
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }
}

impl PathFinder for InMemoryFinder {
    fn find(
        &self,
        cancellation: &SearchCancellation,
        query: &PathQuery,
        max_length: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError> {
        self.config.check_length(max_length)?;
        self.config.check_assets(&query.source_assets)?;
        if query.destination_amount <= 0 {
            return Err(PathSearchError::NonPositiveAmount(query.destination_amount));
        }

        let mut flags = self.config.flags();
        if query.validate_source_balance {
            flags |= SearchFlags::VALIDATE_BALANCE;
        }
        debug!(
            "Finding paths to {} {} from {} assets",
            query.destination_amount,
            query.destination_asset,
            query.source_assets.len()
        );
        self.graph.find_paths(
            cancellation,
            max_length,
            &query.destination_asset,
            query.destination_amount,
            query.source_account.as_ref(),
            &query.source_assets,
            &query.source_asset_balances,
            flags,
            self.config.max_paths_per_asset,
        )
    }

    fn find_fixed_paths(
        &self,
        cancellation: &SearchCancellation,
        source_asset: &Asset,
        amount_to_spend: i64,
        destination_assets: &[Asset],
        max_length: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError> {
        self.config.check_length(max_length)?;
        self.config.check_assets(destination_assets)?;
        if amount_to_spend <= 0 {
            return Err(PathSearchError::NonPositiveAmount(amount_to_spend));
        }

        debug!(
            "Finding paths from {} {} to {} assets",
            amount_to_spend,
            source_asset,
            destination_assets.len()
        );
        self.graph.find_fixed_paths(
            cancellation,
            max_length,
            source_asset,
            amount_to_spend,
            destination_assets,
            self.config.flags(),
            self.config.max_paths_per_asset,
        )
    }
}

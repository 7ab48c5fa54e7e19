//! Path results, search options and result ranking.

use super::asset::Asset;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A conversion route found by the path search.
///
/// Interior nodes are listed in payment order, from the asset following
/// `source_asset` to the asset preceding `destination_asset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Asset the payment is funded with
    pub source_asset: Asset,
    /// Amount of `source_asset` sent
    pub source_amount: i64,
    /// Asset delivered to the receiver
    pub destination_asset: Asset,
    /// Amount of `destination_asset` delivered
    pub destination_amount: i64,
    /// Intermediate conversions
    pub interior_nodes: Vec<Asset>,
}

bitflags! {
    /// Options for a path search.
    ///
    /// # Examples
    /// ```
    /// use orderbook_graph::SearchFlags;
    ///
    /// let flags = SearchFlags::INCLUDE_POOLS | SearchFlags::VALIDATE_BALANCE;
    /// assert!(flags.contains(SearchFlags::INCLUDE_POOLS));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SearchFlags: u32 {
        /// Quote liquidity pools alongside offers
        const INCLUDE_POOLS = 1 << 0;

        /// Only report source assets whose balance covers the required amount
        const VALIDATE_BALANCE = 1 << 1;
    }
}

impl Default for SearchFlags {
    fn default() -> Self {
        SearchFlags::INCLUDE_POOLS
    }
}

/// How results of one search are grouped and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathRanking {
    /// Group by source asset, cheapest source amount first
    BySourceAmount,
    /// Group by destination asset, largest destination amount first
    ByDestinationAmount,
}

impl PathRanking {
    fn group<'a>(&self, path: &'a Path) -> &'a Asset {
        match self {
            PathRanking::BySourceAmount => &path.source_asset,
            PathRanking::ByDestinationAmount => &path.destination_asset,
        }
    }

    fn compare(&self, a: &Path, b: &Path) -> Ordering {
        let by_amount = match self {
            PathRanking::BySourceAmount => a.source_amount.cmp(&b.source_amount),
            PathRanking::ByDestinationAmount => b.destination_amount.cmp(&a.destination_amount),
        };
        self.group(a)
            .canonical()
            .cmp(&self.group(b).canonical())
            .then(by_amount)
            .then(a.interior_nodes.len().cmp(&b.interior_nodes.len()))
    }
}

/// Ranks `paths` within their groups and keeps at most
/// `max_paths_per_asset` of each group. Paths that compare equal keep the
/// order in which the search emitted them.
pub(crate) fn sort_and_filter_paths(
    mut paths: Vec<Path>,
    max_paths_per_asset: usize,
    ranking: PathRanking,
) -> Vec<Path> {
    paths.sort_by(|a, b| ranking.compare(a, b));

    let mut filtered: Vec<Path> = Vec::with_capacity(paths.len());
    let mut count_for_asset = 0usize;
    for path in paths {
        let same_group = filtered
            .last()
            .is_some_and(|last| ranking.group(last) == ranking.group(&path));
        if !same_group {
            count_for_asset = 0;
        }
        if count_for_asset < max_paths_per_asset {
            count_for_asset += 1;
            filtered.push(path);
        }
    }
    filtered
}

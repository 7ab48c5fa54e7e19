//! Bounded multi-hop path search over the graph.
//!
//! The search relaxes amounts hop by hop instead of walking paths depth
//! first. Each hop expands every asset that has a best known amount, keeps
//! the improvements in a separate buffer, and folds that buffer into the
//! frontier before the next hop. Two directions share the same driver:
//!
//! - selling: the destination amount is fixed, amounts flow backwards
//!   towards the candidate source assets and smaller is better
//! - buying: the source amount is fixed, amounts flow forwards towards the
//!   candidate destination assets and larger is better

use super::asset::{AccountId, Asset};
use super::error::{AmmError, PathSearchError};
use super::graph::{Graph, GraphIndex};
use super::interner::AssetId;
use super::offer::Offer;
use super::paths::{Path, PathRanking, SearchFlags, sort_and_filter_paths};
use super::pool::LiquidityPool;
use super::price::{convert_to_buying_units, mul_fraction_round_down};
use super::venues::{EdgeSet, Venues};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// A shared flag used to abort a running search from another thread.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct SearchCancellation(Arc<AtomicBool>);

impl SearchCancellation {
    /// Creates a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests every search using this flag to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A link in a parent chain, stored in a [`PathArena`].
#[derive(Debug, Clone, Copy)]
struct PathNode {
    asset: AssetId,
    prev: Option<usize>,
}

/// Parent chains of every path explored by one search, addressed by index.
#[derive(Debug, Default)]
struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    fn push(&mut self, asset: AssetId, prev: Option<usize>) -> usize {
        self.nodes.push(PathNode { asset, prev });
        self.nodes.len() - 1
    }

    fn chain(&self, node: usize) -> impl Iterator<Item = AssetId> + '_ {
        std::iter::successors(Some(self.nodes[node]), |current| {
            current.prev.map(|prev| self.nodes[prev])
        })
        .map(|node| node.asset)
    }

    fn contains(&self, node: usize, asset: AssetId) -> bool {
        self.chain(node).any(|visited| visited == asset)
    }

    /// The assets of the chain ending at `node`, starting from the root.
    fn path(&self, node: usize) -> Vec<AssetId> {
        let mut path: Vec<AssetId> = self.chain(node).collect();
        path.reverse();
        path
    }
}

/// Direction-specific behavior of the path search.
pub(crate) trait SearchState {
    /// Returns `true` when `asset` is one of the assets the caller asked for.
    fn is_terminal_node(&self, asset: AssetId) -> bool;

    /// Returns `true` when a path ending in `asset` for `amount` should be
    /// reported.
    fn include_path(&self, asset: AssetId, amount: i64) -> bool;

    /// Returns `true` when `alternative` improves on `current`.
    fn better_path_amount(&self, current: i64, alternative: i64) -> bool;

    /// Edges explored from `asset`.
    fn venues<'g>(&self, index: &'g GraphIndex, asset: AssetId) -> &'g EdgeSet;

    /// Amount of the next asset obtained by crossing `offers` with `amount`
    /// of the current asset, or a non-positive value when infeasible.
    ///
    /// `best_amount` is the amount quoted by the pool on the same edge, `0`
    /// when there is none; the better of both is returned.
    fn consume_offers(
        &self,
        amount: i64,
        best_amount: i64,
        offers: &[Arc<Offer>],
    ) -> Result<i64, PathSearchError>;

    /// Amount of the next asset obtained through `pool`.
    fn consume_pool(&self, pool: &LiquidityPool, asset: &Asset, amount: i64)
    -> Result<i64, AmmError>;

    fn include_pools(&self) -> bool;

    /// Records a path, given as interned assets from the search root.
    fn append_to_paths(&mut self, index: &GraphIndex, path: &[AssetId], amount: i64);
}

/// Assets strictly between the root and the last node of `path`.
fn interior(path: &[AssetId]) -> &[AssetId] {
    path.get(1..path.len().saturating_sub(1)).unwrap_or(&[])
}

/// Search state for paths delivering a fixed destination amount.
#[derive(Debug)]
pub(crate) struct SellingSearchState {
    destination_asset: Asset,
    destination_amount: i64,
    ignore_offers_from: Option<AccountId>,
    source_balances: HashMap<AssetId, i64>,
    validate_balance: bool,
    include_pools: bool,
    paths: Vec<Path>,
}

impl SearchState for SellingSearchState {
    fn is_terminal_node(&self, asset: AssetId) -> bool {
        self.source_balances.contains_key(&asset)
    }

    fn include_path(&self, asset: AssetId, amount: i64) -> bool {
        !self.validate_balance
            || self
                .source_balances
                .get(&asset)
                .is_some_and(|balance| *balance >= amount)
    }

    fn better_path_amount(&self, current: i64, alternative: i64) -> bool {
        if current == 0 {
            return true;
        }
        if alternative == 0 {
            return false;
        }
        alternative < current
    }

    fn venues<'g>(&self, index: &'g GraphIndex, asset: AssetId) -> &'g EdgeSet {
        index.selling_edges(asset)
    }

    fn consume_offers(
        &self,
        amount: i64,
        best_amount: i64,
        offers: &[Arc<Offer>],
    ) -> Result<i64, PathSearchError> {
        let next = consume_offers_for_selling_asset(
            offers,
            self.ignore_offers_from.as_ref(),
            amount,
            best_amount,
        )?;
        Ok(next.map_or(best_amount, |next| positive_min(best_amount, next)))
    }

    fn consume_pool(
        &self,
        pool: &LiquidityPool,
        asset: &Asset,
        amount: i64,
    ) -> Result<i64, AmmError> {
        pool.expectation(asset, amount)
    }

    fn include_pools(&self) -> bool {
        self.include_pools
    }

    fn append_to_paths(&mut self, index: &GraphIndex, path: &[AssetId], amount: i64) {
        let Some(&source) = path.last() else {
            return;
        };
        self.paths.push(Path {
            source_asset: index.asset(source).clone(),
            source_amount: amount,
            destination_asset: self.destination_asset.clone(),
            destination_amount: self.destination_amount,
            interior_nodes: interior(path)
                .iter()
                .rev()
                .map(|asset| index.asset(*asset).clone())
                .collect(),
        });
    }
}

/// Search state for paths spending a fixed source amount.
#[derive(Debug)]
pub(crate) struct BuyingSearchState {
    source_asset: Asset,
    source_amount: i64,
    destinations: HashSet<AssetId>,
    include_pools: bool,
    paths: Vec<Path>,
}

impl SearchState for BuyingSearchState {
    fn is_terminal_node(&self, asset: AssetId) -> bool {
        self.destinations.contains(&asset)
    }

    fn include_path(&self, _asset: AssetId, _amount: i64) -> bool {
        true
    }

    fn better_path_amount(&self, current: i64, alternative: i64) -> bool {
        alternative > current
    }

    fn venues<'g>(&self, index: &'g GraphIndex, asset: AssetId) -> &'g EdgeSet {
        index.buying_edges(asset)
    }

    fn consume_offers(
        &self,
        amount: i64,
        best_amount: i64,
        offers: &[Arc<Offer>],
    ) -> Result<i64, PathSearchError> {
        let next = consume_offers_for_buying_asset(offers, amount)?;
        Ok(next.map_or(best_amount, |next| next.max(best_amount)))
    }

    fn consume_pool(
        &self,
        pool: &LiquidityPool,
        asset: &Asset,
        amount: i64,
    ) -> Result<i64, AmmError> {
        pool.payout(asset, amount)
    }

    fn include_pools(&self) -> bool {
        self.include_pools
    }

    fn append_to_paths(&mut self, index: &GraphIndex, path: &[AssetId], amount: i64) {
        let Some(&destination) = path.last() else {
            return;
        };
        self.paths.push(Path {
            source_asset: self.source_asset.clone(),
            source_amount: self.source_amount,
            destination_asset: index.asset(destination).clone(),
            destination_amount: amount,
            interior_nodes: interior(path)
                .iter()
                .map(|asset| index.asset(*asset).clone())
                .collect(),
        });
    }
}

/// The smallest positive of `a` and `b`, or a non-positive value when
/// neither is positive.
fn positive_min(a: i64, b: i64) -> i64 {
    if a <= 0 {
        return b;
    }
    if b <= 0 {
        return a;
    }
    a.min(b)
}

/// Cost, in the buying asset, of extracting `needed` units of the selling
/// asset from `offers`.
///
/// Returns `None` when the offers cannot cover `needed`, when the running
/// cost reaches `best_amount` (when positive), or on arithmetic overflow.
pub(crate) fn consume_offers_for_selling_asset(
    offers: &[Arc<Offer>],
    ignore_offers_from: Option<&AccountId>,
    mut needed: i64,
    best_amount: i64,
) -> Result<Option<i64>, PathSearchError> {
    let mut total_consumed = 0i64;
    for offer in offers {
        if ignore_offers_from.is_some_and(|account| *account == offer.seller) {
            continue;
        }

        let (buying_units, selling_units) = match convert_to_buying_units(
            offer.amount,
            needed,
            i64::from(offer.price.n),
            i64::from(offer.price.d),
        ) {
            Ok(units) => units,
            Err(err) => {
                trace!("Offer {} is not crossable: {}", offer.id, err);
                return Ok(None);
            }
        };

        let Some(total) = total_consumed.checked_add(buying_units) else {
            return Ok(None);
        };
        total_consumed = total;
        if best_amount > 0 && total_consumed >= best_amount {
            return Ok(None);
        }

        needed -= selling_units;
        if needed == 0 {
            return Ok(Some(total_consumed));
        }
        if needed < 0 {
            return Err(PathSearchError::SoldTooMuch);
        }
    }
    Ok(None)
}

/// Amount of the selling asset received by spending `amount` of the buying
/// asset across `offers`.
///
/// Returns `None` when the offers cannot absorb `amount` or on arithmetic
/// overflow.
pub(crate) fn consume_offers_for_buying_asset(
    offers: &[Arc<Offer>],
    mut amount: i64,
) -> Result<Option<i64>, PathSearchError> {
    let mut total_consumed = 0i64;
    for offer in offers {
        let n = i64::from(offer.price.n);
        let d = i64::from(offer.price.d);

        let sold = match mul_fraction_round_down(amount, d, n) {
            Ok(sold) => sold,
            Err(err) => {
                trace!("Offer {} is not crossable: {}", offer.id, err);
                return Ok(None);
            }
        };
        if sold <= offer.amount {
            return Ok(total_consumed.checked_add(sold));
        }

        let Ok((buying_units, selling_units)) =
            convert_to_buying_units(offer.amount, offer.amount, n, d)
        else {
            return Ok(None);
        };
        let Some(total) = total_consumed.checked_add(selling_units) else {
            return Ok(None);
        };
        total_consumed = total;
        amount -= buying_units;
        if amount == 0 {
            return Ok(Some(total_consumed));
        }
        if amount < 0 {
            return Err(PathSearchError::SoldTooMuch);
        }
    }
    Ok(None)
}

/// Quotes one edge: the pool first, then the offers, keeping the better.
pub(crate) fn process_venues<S: SearchState + ?Sized>(
    state: &S,
    asset: &Asset,
    amount: i64,
    venues: &Venues,
) -> Result<i64, PathSearchError> {
    if amount == 0 {
        return Err(PathSearchError::AssetAmountIsZero);
    }

    let mut pool_amount = 0;
    if state.include_pools()
        && let Some(pool) = &venues.pool
    {
        pool_amount = state
            .consume_pool(pool, asset, amount)
            .unwrap_or_else(|err| {
                trace!("Pool {} cannot quote {} {}: {}", pool.id, amount, asset, err);
                0
            });
    }

    if venues.offers.is_empty() {
        return Ok(pool_amount);
    }
    state.consume_offers(amount, pool_amount, &venues.offers)
}

/// Runs the relaxation loop from `target` for at most `max_path_length`
/// hops, reporting paths to `state` as they improve.
pub(crate) fn search<S: SearchState>(
    state: &mut S,
    index: &GraphIndex,
    cancellation: &SearchCancellation,
    max_path_length: usize,
    target: AssetId,
    target_amount: i64,
) -> Result<(), PathSearchError> {
    let total_assets = index.interner.capacity();
    let mut best_amount = vec![0i64; total_assets];
    let mut update_amount = vec![0i64; total_assets];
    let mut best_path: Vec<Option<usize>> = vec![None; total_assets];
    let mut update_path: Vec<Option<usize>> = vec![None; total_assets];
    let mut updated_assets: Vec<usize> = Vec::new();
    let mut arena = PathArena::default();

    let root = arena.push(target, None);
    let target_index = target as usize;
    best_amount[target_index] = target_amount;
    update_amount[target_index] = target_amount;
    best_path[target_index] = Some(root);
    update_path[target_index] = Some(root);

    // Paying with the asset being delivered needs no conversion
    if state.is_terminal_node(target) && state.include_path(target, target_amount) {
        state.append_to_paths(index, &[target], target_amount);
    }

    for hop in 0..max_path_length {
        updated_assets.clear();
        let last_hop = hop + 1 == max_path_length;

        for current in 0..total_assets {
            let current_amount = best_amount[current];
            if current_amount == 0 {
                continue;
            }
            let Some(path_to_current) = best_path[current] else {
                continue;
            };
            let current_id = current as AssetId;
            let current_asset = index.asset(current_id);

            for edge in state.venues(index, current_id) {
                if cancellation.is_cancelled() {
                    debug!("Path search cancelled at hop {}", hop + 1);
                    return Err(PathSearchError::Cancelled);
                }
                let next = edge.key;
                if last_hop && !state.is_terminal_node(next) {
                    continue;
                }
                if arena.contains(path_to_current, next) {
                    continue;
                }

                let next_amount =
                    process_venues(&*state, current_asset, current_amount, &edge.venues)?;
                if next_amount <= 0 {
                    continue;
                }

                let next_index = next as usize;
                if state.better_path_amount(update_amount[next_index], next_amount) {
                    if update_amount[next_index] == best_amount[next_index] {
                        updated_assets.push(next_index);
                    }
                    update_amount[next_index] = next_amount;
                    let node = arena.push(next, Some(path_to_current));
                    update_path[next_index] = Some(node);

                    // Every improvement is reported, not only the final best
                    if state.is_terminal_node(next) && state.include_path(next, next_amount) {
                        let path = arena.path(node);
                        state.append_to_paths(index, &path, next_amount);
                    }
                }
            }
        }

        if !last_hop {
            for &asset in &updated_assets {
                best_amount[asset] = update_amount[asset];
                best_path[asset] = update_path[asset];
            }
        }
    }

    trace!("Path search explored {} nodes", arena.nodes.len());
    Ok(())
}

impl Graph {
    /// Finds paths delivering `destination_amount` of `destination_asset`,
    /// funded by one of `source_assets`.
    ///
    /// Offers owned by `ignore_offers_from` are skipped. With
    /// [`SearchFlags::VALIDATE_BALANCE`], a path is only reported when the
    /// matching entry of `source_balances` covers its source amount. At most
    /// `max_paths_per_asset` paths are kept per source asset, cheapest
    /// first. Assets unknown to the graph are ignored.
    ///
    /// Returns the paths together with the ledger they were computed at.
    ///
    /// # Errors
    /// - [`PathSearchError::BalanceCountMismatch`] when balances are given
    ///   (or required) but do not line up with `source_assets`
    /// - [`PathSearchError::NonPositiveAmount`] for a zero or negative amount
    /// - [`PathSearchError::Cancelled`] when `cancellation` fires
    /// - [`PathSearchError::SoldTooMuch`] on an internal accounting error
    #[allow(clippy::too_many_arguments)]
    pub fn find_paths(
        &self,
        cancellation: &SearchCancellation,
        max_path_length: usize,
        destination_asset: &Asset,
        destination_amount: i64,
        ignore_offers_from: Option<&AccountId>,
        source_assets: &[Asset],
        source_balances: &[i64],
        flags: SearchFlags,
        max_paths_per_asset: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError> {
        let validate_balance = flags.contains(SearchFlags::VALIDATE_BALANCE);
        if (validate_balance || !source_balances.is_empty())
            && source_balances.len() != source_assets.len()
        {
            return Err(PathSearchError::BalanceCountMismatch {
                assets: source_assets.len(),
                balances: source_balances.len(),
            });
        }
        if destination_amount <= 0 {
            return Err(PathSearchError::NonPositiveAmount(destination_amount));
        }

        let index = self.read();
        let last_ledger = index.last_ledger;
        let Some(target) = index.interner.get(destination_asset) else {
            debug!("Destination asset {} is not in the graph", destination_asset);
            return Ok((Vec::new(), last_ledger));
        };

        let source_balances: HashMap<AssetId, i64> = source_assets
            .iter()
            .enumerate()
            .filter_map(|(i, asset)| {
                let id = index.interner.get(asset)?;
                Some((id, source_balances.get(i).copied().unwrap_or(0)))
            })
            .collect();
        if source_balances.is_empty() {
            return Ok((Vec::new(), last_ledger));
        }

        let mut state = SellingSearchState {
            destination_asset: destination_asset.clone(),
            destination_amount,
            ignore_offers_from: ignore_offers_from.cloned(),
            source_balances,
            validate_balance,
            include_pools: flags.contains(SearchFlags::INCLUDE_POOLS),
            paths: Vec::new(),
        };
        search(
            &mut state,
            &index,
            cancellation,
            max_path_length,
            target,
            destination_amount,
        )?;

        debug!(
            "Found {} candidate paths to {} {} at ledger {}",
            state.paths.len(),
            destination_amount,
            destination_asset,
            last_ledger
        );
        let paths = sort_and_filter_paths(
            state.paths,
            max_paths_per_asset,
            PathRanking::BySourceAmount,
        );
        Ok((paths, last_ledger))
    }

    /// Finds paths spending `amount_to_spend` of `source_asset` and
    /// delivering one of `destination_assets`.
    ///
    /// At most `max_paths_per_asset` paths are kept per destination asset,
    /// largest delivery first. Assets unknown to the graph are ignored.
    ///
    /// # Errors
    /// - [`PathSearchError::NonPositiveAmount`] for a zero or negative amount
    /// - [`PathSearchError::Cancelled`] when `cancellation` fires
    /// - [`PathSearchError::SoldTooMuch`] on an internal accounting error
    pub fn find_fixed_paths(
        &self,
        cancellation: &SearchCancellation,
        max_path_length: usize,
        source_asset: &Asset,
        amount_to_spend: i64,
        destination_assets: &[Asset],
        flags: SearchFlags,
        max_paths_per_asset: usize,
    ) -> Result<(Vec<Path>, u32), PathSearchError> {
        if amount_to_spend <= 0 {
            return Err(PathSearchError::NonPositiveAmount(amount_to_spend));
        }

        let index = self.read();
        let last_ledger = index.last_ledger;
        let Some(target) = index.interner.get(source_asset) else {
            debug!("Source asset {} is not in the graph", source_asset);
            return Ok((Vec::new(), last_ledger));
        };

        let destinations: HashSet<AssetId> = destination_assets
            .iter()
            .filter_map(|asset| index.interner.get(asset))
            .collect();
        if destinations.is_empty() {
            return Ok((Vec::new(), last_ledger));
        }

        let mut state = BuyingSearchState {
            source_asset: source_asset.clone(),
            source_amount: amount_to_spend,
            destinations,
            include_pools: flags.contains(SearchFlags::INCLUDE_POOLS),
            paths: Vec::new(),
        };
        search(
            &mut state,
            &index,
            cancellation,
            max_path_length,
            target,
            amount_to_spend,
        )?;

        debug!(
            "Found {} candidate paths from {} {} at ledger {}",
            state.paths.len(),
            amount_to_spend,
            source_asset,
            last_ledger
        );
        let paths = sort_and_filter_paths(
            state.paths,
            max_paths_per_asset,
            PathRanking::ByDestinationAmount,
        );
        Ok((paths, last_ledger))
    }
}

//! Core order book graph: mirrored venue indexes over all offers and pools.

use super::asset::Asset;
use super::batch::Batch;
use super::error::GraphError;
use super::interner::{AssetId, AssetInterner};
use super::offer::{Offer, OfferId};
use super::pool::{LiquidityPool, PoolId};
use super::venues::EdgeSet;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// The assets an offer converts between, by interned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TradingPair {
    pub(crate) selling: AssetId,
    pub(crate) buying: AssetId,
}

/// The committed state of the graph, guarded by the graph's lock.
#[derive(Debug, Default)]
pub(crate) struct GraphIndex {
    pub(crate) interner: AssetInterner,
    /// `selling[a]` holds an edge to `b` for every venue selling `a` for `b`
    pub(crate) selling: Vec<EdgeSet>,
    /// `buying[b]` holds an edge to `a` for every venue selling `a` for `b`
    pub(crate) buying: Vec<EdgeSet>,
    pub(crate) trading_pairs: HashMap<OfferId, TradingPair>,
    pub(crate) pools: HashMap<PoolId, Arc<LiquidityPool>>,
    pub(crate) last_ledger: u32,
}

impl GraphIndex {
    fn intern(&mut self, asset: &Asset) -> AssetId {
        let (id, _) = self.interner.get_or_insert(asset);
        let needed = id as usize + 1;
        if self.selling.len() < needed {
            self.selling.resize_with(needed, EdgeSet::new);
            self.buying.resize_with(needed, EdgeSet::new);
        }
        id
    }

    /// Edges leaving `asset` in the selling index.
    pub(crate) fn selling_edges(&self, asset: AssetId) -> &EdgeSet {
        &self.selling[asset as usize]
    }

    /// Edges leaving `asset` in the buying index.
    pub(crate) fn buying_edges(&self, asset: AssetId) -> &EdgeSet {
        &self.buying[asset as usize]
    }

    /// Returns the asset behind an interned id.
    ///
    /// # Panics
    /// Panics when the id is not in use, which means an edge points at a
    /// released asset.
    pub(crate) fn asset(&self, id: AssetId) -> &Asset {
        self.interner
            .asset(id)
            .unwrap_or_else(|| panic!("asset id {id} is referenced but not interned"))
    }

    fn maybe_release(&mut self, id: AssetId) {
        let index = id as usize;
        if self.selling[index].is_empty() && self.buying[index].is_empty() {
            trace!("Releasing asset id {}", id);
            self.interner.release(id);
        }
    }

    /// Inserts `offer`, replacing any stored offer with the same id.
    pub(crate) fn add_offer(&mut self, offer: Offer) {
        if self.trading_pairs.contains_key(&offer.id) {
            let _ = self.remove_offer(offer.id);
        }
        let selling = self.intern(&offer.selling);
        let buying = self.intern(&offer.buying);
        trace!(
            "Adding offer {} selling {} for {} at {}",
            offer.id, offer.selling, offer.buying, offer.price
        );
        let offer = Arc::new(offer);
        self.trading_pairs
            .insert(offer.id, TradingPair { selling, buying });
        self.selling[selling as usize].add_offer(buying, Arc::clone(&offer));
        self.buying[buying as usize].add_offer(selling, offer);
    }

    /// Removes the offer with `offer_id` from both indexes.
    ///
    /// # Errors
    /// Returns [`GraphError::OfferNotFound`] when the offer is not present.
    ///
    /// # Panics
    /// Panics when the offer is recorded but missing from either index.
    pub(crate) fn remove_offer(&mut self, offer_id: OfferId) -> Result<(), GraphError> {
        let pair = self
            .trading_pairs
            .remove(&offer_id)
            .ok_or(GraphError::OfferNotFound(offer_id))?;

        let from_selling = self.selling[pair.selling as usize].remove_offer(pair.buying, offer_id);
        let from_buying = self.buying[pair.buying as usize].remove_offer(pair.selling, offer_id);
        if !from_selling || !from_buying {
            panic!(
                "offer {offer_id} is tracked but missing from the index (selling: {from_selling}, buying: {from_buying})"
            );
        }

        trace!("Removed offer {}", offer_id);
        self.maybe_release(pair.selling);
        self.maybe_release(pair.buying);
        Ok(())
    }

    /// Inserts `pool` on both directions of its pair, replacing any pool
    /// already trading the pair.
    pub(crate) fn add_pool(&mut self, pool: LiquidityPool) {
        if self.pools.contains_key(&pool.id) {
            let _ = self.remove_pool(pool.id);
        }
        if let (Some(a), Some(b)) = (
            self.interner.get(&pool.asset_a),
            self.interner.get(&pool.asset_b),
        ) && let Some(existing) = self.selling[a as usize]
            .venues(b)
            .and_then(|venues| venues.pool.as_ref())
            .map(|existing| existing.id)
        {
            warn!(
                "Pool {} replaces pool {} on pair {}/{}",
                pool.id, existing, pool.asset_a, pool.asset_b
            );
            let _ = self.remove_pool(existing);
        }

        let a = self.intern(&pool.asset_a);
        let b = self.intern(&pool.asset_b);
        trace!(
            "Adding pool {} for {}/{} with reserves {}/{}",
            pool.id, pool.asset_a, pool.asset_b, pool.reserve_a, pool.reserve_b
        );
        let pool = Arc::new(pool);
        self.selling[a as usize].add_pool(b, Arc::clone(&pool));
        self.selling[b as usize].add_pool(a, Arc::clone(&pool));
        self.buying[a as usize].add_pool(b, Arc::clone(&pool));
        self.buying[b as usize].add_pool(a, Arc::clone(&pool));
        self.pools.insert(pool.id, pool);
    }

    /// Removes the pool with `pool_id` from every edge it sits on.
    ///
    /// # Errors
    /// Returns [`GraphError::PoolNotFound`] when the pool is not present.
    ///
    /// # Panics
    /// Panics when the pool is recorded but missing from any index entry.
    pub(crate) fn remove_pool(&mut self, pool_id: PoolId) -> Result<(), GraphError> {
        let pool = self
            .pools
            .remove(&pool_id)
            .ok_or(GraphError::PoolNotFound(pool_id))?;
        let (Some(a), Some(b)) = (
            self.interner.get(&pool.asset_a),
            self.interner.get(&pool.asset_b),
        ) else {
            panic!("pool {pool_id} is tracked but its assets are not interned");
        };

        let removed = [
            self.selling[a as usize].remove_pool(b),
            self.selling[b as usize].remove_pool(a),
            self.buying[a as usize].remove_pool(b),
            self.buying[b as usize].remove_pool(a),
        ];
        if removed.contains(&false) {
            panic!("pool {pool_id} is tracked but missing from the index: {removed:?}");
        }

        trace!("Removed pool {}", pool_id);
        self.maybe_release(a);
        self.maybe_release(b);
        Ok(())
    }

    /// Offers selling `selling` for `buying`, cheapest first, limited to
    /// `max_price_levels` distinct prices.
    pub(crate) fn find_offers(
        &self,
        selling: &Asset,
        buying: &Asset,
        max_price_levels: usize,
    ) -> Vec<Offer> {
        let (Some(selling), Some(buying)) = (self.interner.get(selling), self.interner.get(buying))
        else {
            return Vec::new();
        };

        let mut result: Vec<Offer> = Vec::new();
        let mut levels = 0usize;
        for offer in self.selling[selling as usize].offers(buying) {
            if result.last().is_none_or(|last| last.price != offer.price) {
                levels += 1;
            }
            if levels > max_price_levels {
                break;
            }
            result.push(Offer::clone(offer));
        }
        result
    }

    pub(crate) fn offers(&self) -> Vec<Offer> {
        let mut offers: Vec<Offer> = self
            .selling
            .iter()
            .flat_map(|edges| edges.iter())
            .flat_map(|edge| edge.venues.offers.iter())
            .map(|offer| Offer::clone(offer))
            .collect();
        offers.sort_by_key(|offer| offer.id);
        offers
    }

    pub(crate) fn liquidity_pools(&self) -> Vec<LiquidityPool> {
        let mut pools: Vec<LiquidityPool> = self
            .pools
            .values()
            .map(|pool| LiquidityPool::clone(pool))
            .collect();
        pools.sort_by_key(|pool| pool.id);
        pools
    }

    fn inconsistent(message: String) -> GraphError {
        GraphError::InconsistentIndex { message }
    }

    /// Walks both indexes and checks that they mirror each other.
    pub(crate) fn verify(&self) -> Result<(Vec<Offer>, Vec<LiquidityPool>), GraphError> {
        let mut seen_offers: HashSet<OfferId> = HashSet::new();
        let mut offers = Vec::new();

        for (from, edges) in self.selling.iter().enumerate() {
            let from = from as AssetId;
            if !edges.is_empty() && self.interner.asset(from).is_none() {
                return Err(Self::inconsistent(format!(
                    "selling index has edges for released asset id {from}"
                )));
            }
            for edge in edges {
                let to = edge.key;
                let (Some(selling), Some(buying)) =
                    (self.interner.asset(from), self.interner.asset(to))
                else {
                    return Err(Self::inconsistent(format!(
                        "edge {from} -> {to} points at a released asset"
                    )));
                };
                if edge.venues.is_empty() {
                    return Err(Self::inconsistent(format!(
                        "empty venues on edge {selling} -> {buying}"
                    )));
                }
                if edge
                    .venues
                    .offers
                    .windows(2)
                    .any(|pair| pair[1].price.cheaper(&pair[0].price))
                {
                    return Err(Self::inconsistent(format!(
                        "offers on edge {selling} -> {buying} are not sorted by price"
                    )));
                }

                let mirrored = self.buying[to as usize].offers(from);
                for offer in &edge.venues.offers {
                    offer.validate()?;
                    if offer.selling != *selling || offer.buying != *buying {
                        return Err(Self::inconsistent(format!(
                            "offer {} is stored on edge {selling} -> {buying}",
                            offer.id
                        )));
                    }
                    if !seen_offers.insert(offer.id) {
                        return Err(Self::inconsistent(format!(
                            "offer {} appears more than once",
                            offer.id
                        )));
                    }
                    if self.trading_pairs.get(&offer.id)
                        != Some(&TradingPair {
                            selling: from,
                            buying: to,
                        })
                    {
                        return Err(Self::inconsistent(format!(
                            "offer {} has no matching trading pair",
                            offer.id
                        )));
                    }
                    if !mirrored.iter().any(|other| **other == **offer) {
                        return Err(Self::inconsistent(format!(
                            "offer {} is missing from the buying index",
                            offer.id
                        )));
                    }
                    offers.push(Offer::clone(offer));
                }

                if let Some(pool) = &edge.venues.pool {
                    pool.validate()?;
                    if self.pools.get(&pool.id).map(|stored| stored.as_ref()) != Some(pool.as_ref())
                    {
                        return Err(Self::inconsistent(format!(
                            "pool {} on edge {selling} -> {buying} is not tracked",
                            pool.id
                        )));
                    }
                    if pool.other_asset(selling) != Some(buying) {
                        return Err(Self::inconsistent(format!(
                            "pool {} is stored on edge {selling} -> {buying}",
                            pool.id
                        )));
                    }
                }
            }
        }

        let buying_offer_count: usize = self
            .buying
            .iter()
            .flat_map(|edges| edges.iter())
            .map(|edge| edge.venues.offers.len())
            .sum();
        if buying_offer_count != offers.len() || self.trading_pairs.len() != offers.len() {
            return Err(Self::inconsistent(format!(
                "selling index holds {} offers, buying index {}, trading pairs {}",
                offers.len(),
                buying_offer_count,
                self.trading_pairs.len()
            )));
        }

        for pool in self.pools.values() {
            let (Some(a), Some(b)) = (
                self.interner.get(&pool.asset_a),
                self.interner.get(&pool.asset_b),
            ) else {
                return Err(Self::inconsistent(format!(
                    "pool {} trades an asset that is not interned",
                    pool.id
                )));
            };
            let holds = |index: &[EdgeSet], from: AssetId, to: AssetId| {
                index[from as usize]
                    .venues(to)
                    .and_then(|venues| venues.pool.as_ref())
                    .is_some_and(|stored| stored.id == pool.id)
            };
            let (selling, buying) = (self.selling.as_slice(), self.buying.as_slice());
            if !(holds(selling, a, b)
                && holds(selling, b, a)
                && holds(buying, a, b)
                && holds(buying, b, a))
            {
                return Err(Self::inconsistent(format!(
                    "pool {} is missing from one of its edges",
                    pool.id
                )));
            }
        }

        for id in 0..self.interner.capacity() {
            let id = id as AssetId;
            if let Some(asset) = self.interner.asset(id)
                && self.selling[id as usize].is_empty()
                && self.buying[id as usize].is_empty()
            {
                return Err(Self::inconsistent(format!(
                    "asset {asset} is interned without any venue"
                )));
            }
        }

        offers.sort_by_key(|offer| offer.id);
        Ok((offers, self.liquidity_pools()))
    }
}

/// An in-memory graph of every offer and liquidity pool on the exchange.
///
/// Mutations are staged in a [`Batch`] and committed atomically, once per
/// ledger, under the graph's exclusive lock. Queries take the shared lock
/// for their whole duration, so each one observes a single committed state.
///
/// # Examples
///
/// ```
/// use orderbook_graph::orderbook::{AccountId, Asset, Graph, Offer, Price};
///
/// let graph = Graph::new();
/// let usd = Asset::issued("USD", "GISSUER");
/// graph.add_offer(Offer::new(
///     1,
///     AccountId::new("GSELLER"),
///     Asset::Native,
///     usd.clone(),
///     100,
///     Price::new(1, 2),
/// ));
/// graph.apply(1).unwrap();
///
/// let (asks, bids, ledger) = graph.find_asks_and_bids(&Asset::Native, &usd, 10);
/// assert_eq!(asks.len(), 1);
/// assert!(bids.is_empty());
/// assert_eq!(ledger, 1);
/// ```
pub struct Graph {
    pub(super) index: RwLock<GraphIndex>,
    /// Default batch receiving the graph-level `add_*`/`remove_*` calls
    pub(super) pending: Mutex<Batch>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(GraphIndex::default()),
            pending: Mutex::new(Batch::new()),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, GraphIndex> {
        self.index.read()
    }

    /// Queues `offer` in the pending batch. An offer with the same id is
    /// replaced when the batch is applied.
    pub fn add_offer(&self, offer: Offer) {
        self.pending.lock().add_offer(offer);
    }

    /// Queues the removal of `offer_id` in the pending batch.
    pub fn remove_offer(&self, offer_id: OfferId) {
        self.pending.lock().remove_offer(offer_id);
    }

    /// Queues `pool` in the pending batch.
    pub fn add_liquidity_pool(&self, pool: LiquidityPool) {
        self.pending.lock().add_liquidity_pool(pool);
    }

    /// Queues the removal of `pool_id` in the pending batch.
    pub fn remove_liquidity_pool(&self, pool_id: PoolId) {
        self.pending.lock().remove_liquidity_pool(pool_id);
    }

    /// Number of operations waiting in the pending batch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Resets the graph to its initial state and drops the pending batch.
    pub fn clear(&self) {
        let mut pending = self.pending.lock();
        let mut index = self.index.write();
        *index = GraphIndex::default();
        *pending = Batch::new();
        info!("Order book graph cleared");
    }

    /// Sequence of the last ledger applied to the graph, `0` when none.
    #[must_use]
    pub fn last_applied_ledger(&self) -> u32 {
        self.index.read().last_ledger
    }

    /// Returns `true` when the graph holds no offer and no pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let index = self.index.read();
        index.trading_pairs.is_empty() && index.pools.is_empty()
    }

    /// Number of committed offers.
    #[must_use]
    pub fn offer_count(&self) -> usize {
        self.index.read().trading_pairs.len()
    }

    /// All committed offers, ordered by id.
    #[must_use]
    pub fn offers(&self) -> Vec<Offer> {
        self.index.read().offers()
    }

    /// All committed offers keyed by id.
    #[must_use]
    pub fn offers_map(&self) -> HashMap<OfferId, Offer> {
        self.offers()
            .into_iter()
            .map(|offer| (offer.id, offer))
            .collect()
    }

    /// All committed liquidity pools, ordered by id.
    #[must_use]
    pub fn liquidity_pools(&self) -> Vec<LiquidityPool> {
        self.index.read().liquidity_pools()
    }

    /// Returns the asks (offers selling `selling` for `buying`) and the bids
    /// (offers selling `buying` for `selling`), each limited to
    /// `max_price_levels` distinct prices, cheapest first, together with
    /// the last applied ledger.
    #[must_use]
    pub fn find_asks_and_bids(
        &self,
        selling: &Asset,
        buying: &Asset,
        max_price_levels: usize,
    ) -> (Vec<Offer>, Vec<Offer>, u32) {
        let index = self.index.read();
        let asks = index.find_offers(selling, buying, max_price_levels);
        let bids = index.find_offers(buying, selling, max_price_levels);
        (asks, bids, index.last_ledger)
    }

    /// Checks the internal consistency of the committed graph.
    ///
    /// Returns every offer and pool when the indexes agree with each other.
    ///
    /// # Errors
    /// Returns [`GraphError::InconsistentIndex`] describing the first
    /// disagreement found, or the validation error of a malformed entry.
    pub fn verify(&self) -> Result<(Vec<Offer>, Vec<LiquidityPool>), GraphError> {
        self.index.read().verify()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.index.read();
        f.debug_struct("Graph")
            .field("offers", &index.trading_pairs.len())
            .field("pools", &index.pools.len())
            .field("assets", &index.interner.len())
            .field("last_ledger", &index.last_ledger)
            .finish()
    }
}

//! Venue sets: the offers and pool available for one asset pair.
//!
//! An [`EdgeSet`] holds every outgoing edge of one asset in one index of
//! the graph. Each edge points at another asset and carries the
//! [`Venues`] for that pair: offers sorted from cheapest to most expensive
//! and at most one liquidity pool. An edge with no offers and no pool is
//! removed immediately.

use super::interner::AssetId;
use super::offer::{Offer, OfferId};
use super::pool::LiquidityPool;
use std::sync::Arc;
use tracing::trace;

/// The offers and pool available to convert between two assets.
#[derive(Debug, Clone, Default)]
pub struct Venues {
    /// Offers sorted ascending by price, ties kept in insertion order
    pub offers: Vec<Arc<Offer>>,
    /// Constant-product pool trading the pair, if any
    pub pool: Option<Arc<LiquidityPool>>,
}

impl Venues {
    /// Returns `true` when there is nothing left to trade against.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty() && self.pool.is_none()
    }
}

/// An edge of the graph, from the owning asset to `key`.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Asset at the other end of the edge
    pub key: AssetId,
    /// Venues available along the edge
    pub venues: Venues,
}

/// All edges leaving one asset in one index.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    /// Creates an empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the asset has no edges.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterates over the edges in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    fn position(&self, key: AssetId) -> Option<usize> {
        self.edges.iter().position(|edge| edge.key == key)
    }

    fn entry(&mut self, key: AssetId) -> &mut Venues {
        let index = match self.position(key) {
            Some(index) => index,
            None => {
                self.edges.push(Edge {
                    key,
                    venues: Venues::default(),
                });
                self.edges.len() - 1
            }
        };
        &mut self.edges[index].venues
    }

    /// Returns the venues for `key`, if the edge exists.
    #[must_use]
    pub fn venues(&self, key: AssetId) -> Option<&Venues> {
        self.edges
            .iter()
            .find(|edge| edge.key == key)
            .map(|edge| &edge.venues)
    }

    /// Returns the sorted offers for `key`; empty when there is no edge.
    #[must_use]
    pub fn offers(&self, key: AssetId) -> &[Arc<Offer>] {
        self.venues(key)
            .map(|venues| venues.offers.as_slice())
            .unwrap_or(&[])
    }

    /// Inserts an offer on the edge to `key`, keeping the list sorted by price.
    ///
    /// The insertion point is the first offer strictly more expensive than
    /// the new one, so offers at the same price keep their arrival order.
    pub fn add_offer(&mut self, key: AssetId, offer: Arc<Offer>) {
        let offers = &mut self.entry(key).offers;
        let index = offers.partition_point(|existing| !offer.price.cheaper(&existing.price));
        trace!(
            "Inserting offer {} at position {} of {} on edge to {}",
            offer.id,
            index,
            offers.len(),
            key
        );
        offers.insert(index, offer);
    }

    /// Removes the offer with `offer_id` from the edge to `key`.
    ///
    /// Returns `false` when the offer is not on that edge.
    pub fn remove_offer(&mut self, key: AssetId, offer_id: OfferId) -> bool {
        let Some(edge_index) = self.position(key) else {
            return false;
        };
        let venues = &mut self.edges[edge_index].venues;
        let Some(offer_index) = venues.offers.iter().position(|offer| offer.id == offer_id) else {
            return false;
        };
        venues.offers.remove(offer_index);
        if venues.is_empty() {
            self.edges.remove(edge_index);
        }
        true
    }

    /// Attaches `pool` to the edge to `key`, replacing any previous pool.
    pub fn add_pool(&mut self, key: AssetId, pool: Arc<LiquidityPool>) {
        self.entry(key).pool = Some(pool);
    }

    /// Detaches the pool from the edge to `key`.
    ///
    /// Returns `false` when the edge has no pool.
    pub fn remove_pool(&mut self, key: AssetId) -> bool {
        let Some(edge_index) = self.position(key) else {
            return false;
        };
        let venues = &mut self.edges[edge_index].venues;
        if venues.pool.take().is_none() {
            return false;
        }
        if venues.is_empty() {
            self.edges.remove(edge_index);
        }
        true
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

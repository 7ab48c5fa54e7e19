//! Staged mutations and their atomic application to the graph.
//!
//! A [`Batch`] records offer and pool changes in submission order. Nothing
//! is visible to readers until the batch is applied for a ledger, at which
//! point every operation is replayed under the graph's exclusive lock.

use super::error::GraphError;
use super::graph::{Graph, GraphIndex};
use super::offer::{Offer, OfferId};
use super::pool::{LiquidityPool, PoolId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A single staged mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchOperation {
    /// Insert an offer, replacing any offer with the same id.
    AddOffer(Offer),

    /// Remove an offer by its identifier.
    RemoveOffer(OfferId),

    /// Insert a liquidity pool, replacing any pool on the same pair.
    AddLiquidityPool(LiquidityPool),

    /// Remove a liquidity pool by its identifier.
    RemoveLiquidityPool(PoolId),
}

/// An ordered list of staged mutations, applied at most once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Batch {
    operations: Vec<BatchOperation>,
    committed: bool,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    ///
    /// # Panics
    /// Panics when the batch has already been applied.
    pub fn push(&mut self, operation: BatchOperation) -> &mut Self {
        assert!(!self.committed, "batch already applied");
        self.operations.push(operation);
        self
    }

    /// Stages the insertion of `offer`.
    pub fn add_offer(&mut self, offer: Offer) -> &mut Self {
        self.push(BatchOperation::AddOffer(offer))
    }

    /// Stages the removal of `offer_id`.
    pub fn remove_offer(&mut self, offer_id: OfferId) -> &mut Self {
        self.push(BatchOperation::RemoveOffer(offer_id))
    }

    /// Stages the insertion of `pool`.
    pub fn add_liquidity_pool(&mut self, pool: LiquidityPool) -> &mut Self {
        self.push(BatchOperation::AddLiquidityPool(pool))
    }

    /// Stages the removal of `pool_id`.
    pub fn remove_liquidity_pool(&mut self, pool_id: PoolId) -> &mut Self {
        self.push(BatchOperation::RemoveLiquidityPool(pool_id))
    }

    /// Staged operations in submission order.
    #[must_use]
    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    /// Number of staged operations.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` when nothing is staged.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns `true` once the batch has been applied.
    #[must_use]
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Replays every operation against `index` in FIFO order.
    ///
    /// Removals of ids that are not present are skipped, so replaying a
    /// batch that removes the same offer twice is harmless. Offers and pools
    /// that fail validation never reach the index; an invalid re-add leaves
    /// the stored entry in place.
    fn replay(&self, index: &mut GraphIndex) {
        for operation in &self.operations {
            match operation {
                BatchOperation::AddOffer(offer) => match offer.validate() {
                    Ok(()) => index.add_offer(offer.clone()),
                    Err(err) => warn!("Skipping offer: {}", err),
                },
                BatchOperation::RemoveOffer(offer_id) => {
                    if let Err(err) = index.remove_offer(*offer_id) {
                        debug!("Skipping removal: {}", err);
                    }
                }
                BatchOperation::AddLiquidityPool(pool) => match pool.validate() {
                    Ok(()) => index.add_pool(pool.clone()),
                    Err(err) => warn!("Skipping liquidity pool: {}", err),
                },
                BatchOperation::RemoveLiquidityPool(pool_id) => {
                    if let Err(err) = index.remove_pool(*pool_id) {
                        debug!("Skipping removal: {}", err);
                    }
                }
            }
        }
    }
}

impl Graph {
    /// Applies the graph's pending batch for `ledger` and starts a new one.
    ///
    /// # Errors
    /// Returns [`GraphError::UnexpectedLedger`] when `ledger` does not move
    /// the graph forward. The pending batch is kept in that case.
    pub fn apply(&self, ledger: u32) -> Result<(), GraphError> {
        let mut pending = self.pending.lock();
        self.apply_batch(&mut pending, ledger)?;
        *pending = Batch::new();
        Ok(())
    }

    /// Atomically applies `batch` for `ledger`.
    ///
    /// Readers either observe the graph before the batch or after all of it.
    ///
    /// # Errors
    /// Returns [`GraphError::UnexpectedLedger`] when `ledger` is `0` or not
    /// greater than the last applied ledger. The graph is left untouched and
    /// the batch stays uncommitted.
    ///
    /// # Panics
    /// Panics when the batch has already been applied.
    pub fn apply_batch(&self, batch: &mut Batch, ledger: u32) -> Result<(), GraphError> {
        assert!(!batch.committed, "batch already applied");

        let mut index = self.index.write();
        let last_applied = index.last_ledger;
        if ledger == 0 || (last_applied > 0 && ledger <= last_applied) {
            warn!(
                "Rejecting batch for ledger {} after ledger {}",
                ledger, last_applied
            );
            return Err(GraphError::UnexpectedLedger {
                last_applied,
                requested: ledger,
            });
        }

        batch.replay(&mut index);
        batch.committed = true;
        index.last_ledger = ledger;

        info!(
            "Applied {} operations for ledger {} ({} offers, {} pools)",
            batch.len(),
            ledger,
            index.trading_pairs.len(),
            index.pools.len()
        );

        #[cfg(feature = "metrics")]
        {
            metrics::counter!("orderbook_graph_batches_applied").increment(1);
            metrics::counter!("orderbook_graph_operations_applied").increment(batch.len() as u64);
            metrics::gauge!("orderbook_graph_offers").set(index.trading_pairs.len() as f64);
            metrics::gauge!("orderbook_graph_last_ledger").set(f64::from(ledger));
        }

        Ok(())
    }

    /// Drops every operation staged in the pending batch.
    pub fn discard(&self) {
        let mut pending = self.pending.lock();
        debug!("Discarding {} pending operations", pending.len());
        *pending = Batch::new();
    }
}

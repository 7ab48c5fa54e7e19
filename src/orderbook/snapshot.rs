//! Point-in-time copies of the graph, with checksum-protected packaging.

use super::batch::Batch;
use super::error::GraphError;
use super::graph::{Graph, GraphIndex};
use super::offer::Offer;
use super::pool::LiquidityPool;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

/// Every offer and pool of the graph at a given ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Last ledger applied when the snapshot was taken
    pub ledger: u32,

    /// Offers ordered by id
    pub offers: Vec<Offer>,

    /// Liquidity pools ordered by id
    pub pools: Vec<LiquidityPool>,
}

impl GraphSnapshot {
    /// Returns `true` when the snapshot holds no offer and no pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty() && self.pools.is_empty()
    }
}

/// Format version used for checksum-enabled graph snapshots.
pub const GRAPH_SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for [`GraphSnapshot`] instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshotPackage {
    /// Version of the snapshot schema.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: GraphSnapshot,
    /// Hex-encoded SHA-256 of the serialized snapshot.
    pub checksum: String,
}

impl GraphSnapshotPackage {
    /// Wraps `snapshot`, computing its checksum.
    pub fn new(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: GRAPH_SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(self).map_err(|error| GraphError::SerializationError {
            message: error.to_string(),
        })
    }

    pub fn from_json(data: &str) -> Result<Self, GraphError> {
        serde_json::from_str(data).map_err(|error| GraphError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validates the version and checksum.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.version != GRAPH_SNAPSHOT_FORMAT_VERSION {
            return Err(GraphError::UnsupportedSnapshotVersion {
                found: self.version,
                expected: GRAPH_SNAPSHOT_FORMAT_VERSION,
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(GraphError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }
        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    pub fn into_snapshot(self) -> Result<GraphSnapshot, GraphError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &GraphSnapshot) -> Result<String, GraphError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| GraphError::SerializationError {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Graph {
    /// Copies the committed graph.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let index = self.read();
        GraphSnapshot {
            ledger: index.last_ledger,
            offers: index.offers(),
            pools: index.liquidity_pools(),
        }
    }

    /// Copies the committed graph into a checksum-protected package.
    pub fn snapshot_package(&self) -> Result<GraphSnapshotPackage, GraphError> {
        GraphSnapshotPackage::new(self.snapshot())
    }

    /// Serializes a checksum-protected snapshot to JSON.
    pub fn snapshot_to_json(&self) -> Result<String, GraphError> {
        self.snapshot_package()?.to_json()
    }

    /// Replaces the whole graph with the content of `snapshot`.
    ///
    /// The new state is built and verified aside, then swapped in under the
    /// exclusive lock; the pending batch is dropped. On error the graph is
    /// left untouched.
    ///
    /// # Errors
    /// Returns the validation error of the first malformed offer or pool.
    pub fn restore_from_snapshot(&self, snapshot: GraphSnapshot) -> Result<(), GraphError> {
        for offer in &snapshot.offers {
            offer.validate()?;
        }
        for pool in &snapshot.pools {
            pool.validate()?;
        }

        let mut restored = GraphIndex::default();
        for offer in snapshot.offers {
            restored.add_offer(offer);
        }
        for pool in snapshot.pools {
            restored.add_pool(pool);
        }
        restored.last_ledger = snapshot.ledger;
        restored.verify()?;

        let mut pending = self.pending.lock();
        let mut index = self.index.write();
        info!(
            "Restored {} offers and {} pools at ledger {}",
            restored.trading_pairs.len(),
            restored.pools.len(),
            restored.last_ledger
        );
        *index = restored;
        *pending = Batch::new();
        Ok(())
    }

    /// Restores the graph from a checksum-validated package.
    pub fn restore_from_snapshot_package(
        &self,
        package: GraphSnapshotPackage,
    ) -> Result<(), GraphError> {
        self.restore_from_snapshot(package.into_snapshot()?)
    }

    /// Restores the graph from a JSON snapshot package.
    pub fn restore_from_snapshot_json(&self, data: &str) -> Result<(), GraphError> {
        let package = GraphSnapshotPackage::from_json(data)?;
        self.restore_from_snapshot_package(package)
    }
}

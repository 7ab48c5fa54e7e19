//! Constant-product liquidity pools.

use super::amm::{calculate_pool_expectation, calculate_pool_payout};
use super::asset::Asset;
use super::error::{AmmError, GraphError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Maximum pool fee, in basis points.
pub const MAX_FEE_BPS: i32 = 10_000;

/// Identifier of a liquidity pool.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    /// Derives the identifier of the pool trading `asset_a`/`asset_b` with
    /// the given fee. The asset order does not matter.
    #[must_use]
    pub fn derive(asset_a: &Asset, asset_b: &Asset, fee_bps: i32) -> Self {
        let (first, second) = ordered_pair(asset_a, asset_b);
        let mut hasher = Sha256::new();
        hasher.update(first.canonical().as_bytes());
        hasher.update(b"|");
        hasher.update(second.canonical().as_bytes());
        hasher.update(b"|");
        hasher.update(fee_bps.to_be_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        PoolId(bytes)
    }

    /// Parses a 64 character hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(PoolId(bytes))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({self})")
    }
}

impl Serialize for PoolId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PoolId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        PoolId::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid pool id: {raw}")))
    }
}

fn ordered_pair<'a>(a: &'a Asset, b: &'a Asset) -> (&'a Asset, &'a Asset) {
    if a.canonical() <= b.canonical() {
        (a, b)
    } else {
        (b, a)
    }
}

/// A constant-product pool holding reserves of two assets.
///
/// `asset_a` always sorts before `asset_b` by canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    /// Pool identifier
    pub id: PoolId,
    /// First asset of the pair
    pub asset_a: Asset,
    /// Second asset of the pair
    pub asset_b: Asset,
    /// Reserve of `asset_a`
    pub reserve_a: i64,
    /// Reserve of `asset_b`
    pub reserve_b: i64,
    /// Trading fee in basis points
    pub fee_bps: i32,
}

impl LiquidityPool {
    /// Creates a pool, ordering the asset pair and deriving its identifier.
    pub fn new(
        asset_a: Asset,
        asset_b: Asset,
        reserve_a: i64,
        reserve_b: i64,
        fee_bps: i32,
    ) -> Self {
        let id = PoolId::derive(&asset_a, &asset_b, fee_bps);
        if asset_a.canonical() <= asset_b.canonical() {
            Self {
                id,
                asset_a,
                asset_b,
                reserve_a,
                reserve_b,
                fee_bps,
            }
        } else {
            Self {
                id,
                asset_a: asset_b,
                asset_b: asset_a,
                reserve_a: reserve_b,
                reserve_b: reserve_a,
                fee_bps,
            }
        }
    }

    /// Checks the pool can be placed in the graph.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidPool`] for identical assets, negative
    /// reserves or a fee outside `0..=10000` basis points.
    pub fn validate(&self) -> Result<(), GraphError> {
        let message = if self.asset_a == self.asset_b {
            format!("both assets are {}", self.asset_a)
        } else if self.reserve_a < 0 || self.reserve_b < 0 {
            format!(
                "reserves must not be negative, got {}/{}",
                self.reserve_a, self.reserve_b
            )
        } else if !(0..=MAX_FEE_BPS).contains(&self.fee_bps) {
            format!("fee {} bps out of range", self.fee_bps)
        } else {
            return Ok(());
        };
        Err(GraphError::InvalidPool {
            id: self.id,
            message,
        })
    }

    /// Returns the other asset of the pair, if `asset` is traded by the pool.
    #[must_use]
    pub fn other_asset(&self, asset: &Asset) -> Option<&Asset> {
        if *asset == self.asset_a {
            Some(&self.asset_b)
        } else if *asset == self.asset_b {
            Some(&self.asset_a)
        } else {
            None
        }
    }

    /// Returns `(reserve of asset, reserve of the other asset)`.
    #[must_use]
    pub fn reserves_for(&self, asset: &Asset) -> Option<(i64, i64)> {
        if *asset == self.asset_a {
            Some((self.reserve_a, self.reserve_b))
        } else if *asset == self.asset_b {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// How much of the other asset the pool pays for depositing `amount` of `asset`.
    ///
    /// # Errors
    /// Returns an [`AmmError`] when `asset` is not in the pool or the quote
    /// is infeasible.
    pub fn payout(&self, asset: &Asset, amount: i64) -> Result<i64, AmmError> {
        let (reserve_in, reserve_out) =
            self.reserves_for(asset)
                .ok_or_else(|| AmmError::AssetNotInPool {
                    asset: asset.clone(),
                })?;
        calculate_pool_payout(reserve_in, reserve_out, amount, self.fee_bps)
    }

    /// How much of the other asset must be deposited to receive `amount` of `asset`.
    ///
    /// # Errors
    /// Returns an [`AmmError`] when `asset` is not in the pool or the quote
    /// is infeasible.
    pub fn expectation(&self, asset: &Asset, amount: i64) -> Result<i64, AmmError> {
        let (reserve_out, reserve_in) =
            self.reserves_for(asset)
                .ok_or_else(|| AmmError::AssetNotInPool {
                    asset: asset.clone(),
                })?;
        calculate_pool_expectation(reserve_in, reserve_out, amount, self.fee_bps)
    }
}

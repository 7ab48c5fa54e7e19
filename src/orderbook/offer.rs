//! Standing offers on the exchange.

use super::asset::{AccountId, Asset};
use super::error::GraphError;
use super::price::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub i64);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OfferId {
    fn from(id: i64) -> Self {
        OfferId(id)
    }
}

/// A standing order to sell `amount` of `selling` for `buying` at `price`.
///
/// Offers are never mutated once they are in the graph: an update is a
/// re-add with the same id, which replaces the stored offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer identifier
    pub id: OfferId,
    /// Account that owns the offer
    pub seller: AccountId,
    /// Asset being sold
    pub selling: Asset,
    /// Asset being bought
    pub buying: Asset,
    /// Amount of the selling asset on offer
    pub amount: i64,
    /// Units of `buying` per unit of `selling`
    pub price: Price,
}

impl Offer {
    /// Creates a new offer.
    pub fn new(
        id: impl Into<OfferId>,
        seller: AccountId,
        selling: Asset,
        buying: Asset,
        amount: i64,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            seller,
            selling,
            buying,
            amount,
            price,
        }
    }

    /// Checks that the offer can be placed in the graph.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidOffer`] when the amount or price is not
    /// positive, or when the offer trades an asset for itself.
    pub fn validate(&self) -> Result<(), GraphError> {
        let message = if self.amount <= 0 {
            format!("amount must be positive, got {}", self.amount)
        } else if !self.price.is_valid() {
            format!("price must be positive, got {}", self.price)
        } else if self.selling == self.buying {
            format!("selling and buying are both {}", self.selling)
        } else {
            return Ok(());
        };
        Err(GraphError::InvalidOffer {
            id: self.id,
            message,
        })
    }
}

//! Error types for the order book graph, the exchange math and path search.
//!
//! Recoverable conditions (unknown offers, arithmetic that does not fit,
//! out-of-order ledgers, cancelled searches) are returned as typed errors.
//! Corrupted internal state is never reported through these types: it
//! panics at the point of detection.

use crate::orderbook::asset::Asset;
use crate::orderbook::offer::OfferId;
use crate::orderbook::pool::PoolId;
use thiserror::Error;

/// Errors raised by rational price arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PriceError {
    /// The result does not fit in a signed 64-bit amount.
    #[error("price arithmetic overflow")]
    Overflow,

    /// The fraction has a zero denominator.
    #[error("price has a zero denominator")]
    ZeroDenominator,

    /// An operand was negative.
    #[error("price arithmetic on a negative operand")]
    NegativeOperand,
}

/// Errors raised by constant-product pool quoting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AmmError {
    /// Fee outside of `0..10000` basis points.
    #[error("invalid pool fee: {fee_bps} bps")]
    InvalidFee {
        /// The rejected fee in basis points
        fee_bps: i32,
    },

    /// A reserve or trade amount was zero or negative.
    #[error("pool amounts must be positive")]
    NonPositiveAmount,

    /// Depositing the amount would overflow the input reserve.
    #[error("deposit of {amount_in} overflows reserve {reserve_in}")]
    ReserveOverflow {
        /// Reserve of the deposited asset
        reserve_in: i64,
        /// Amount being deposited
        amount_in: i64,
    },

    /// The pool cannot disburse the requested amount.
    #[error("insufficient reserve: requested {amount_out}, reserve {reserve_out}")]
    InsufficientReserve {
        /// Reserve of the disbursed asset
        reserve_out: i64,
        /// Amount requested
        amount_out: i64,
    },

    /// The quote does not fit in a signed 64-bit amount.
    #[error("pool quote overflow")]
    Overflow,

    /// The pool does not trade the requested asset.
    #[error("asset {asset} is not traded by the pool")]
    AssetNotInPool {
        /// The asset that was requested
        asset: Asset,
    },
}

/// Errors that can occur while maintaining the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// A batch was applied with a ledger sequence that does not advance the graph.
    #[error("unexpected ledger: requested {requested}, last applied {last_applied}")]
    UnexpectedLedger {
        /// Last ledger committed to the graph
        last_applied: u32,
        /// Ledger that was requested
        requested: u32,
    },

    /// The offer is not present in the graph.
    #[error("offer not present: {0}")]
    OfferNotFound(OfferId),

    /// The liquidity pool is not present in the graph.
    #[error("liquidity pool not present: {0}")]
    PoolNotFound(PoolId),

    /// An offer failed validation.
    #[error("invalid offer {id}: {message}")]
    InvalidOffer {
        /// Identifier of the rejected offer
        id: OfferId,
        /// Description of the problem
        message: String,
    },

    /// A liquidity pool failed validation.
    #[error("invalid liquidity pool {id}: {message}")]
    InvalidPool {
        /// Identifier of the rejected pool
        id: PoolId,
        /// Description of the problem
        message: String,
    },

    /// The selling and buying indexes disagree with each other.
    #[error("inconsistent index: {message}")]
    InconsistentIndex {
        /// Description of the inconsistency
        message: String,
    },

    /// Error while serializing snapshot data
    #[error("serialization error: {message}")]
    SerializationError {
        /// Underlying error message
        message: String,
    },

    /// Error while deserializing snapshot data
    #[error("deserialization error: {message}")]
    DeserializationError {
        /// Underlying error message
        message: String,
    },

    /// Snapshot integrity check failed
    #[error("checksum mismatch: expected {expected}, but computed {actual}")]
    ChecksumMismatch {
        /// Expected checksum value
        expected: String,
        /// Actual checksum value
        actual: String,
    },

    /// The snapshot format version is not supported.
    #[error("unsupported snapshot version: {found} (expected {expected})")]
    UnsupportedSnapshotVersion {
        /// Version found in the package
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}

/// Errors that can occur while searching for payment paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PathSearchError {
    /// The search was cancelled by the caller.
    #[error("path search cancelled")]
    Cancelled,

    /// A hop was asked to convert a zero amount.
    #[error("current asset amount is 0")]
    AssetAmountIsZero,

    /// Consuming offers sold more than the requested amount.
    #[error("sold more than current balance")]
    SoldTooMuch,

    /// Candidate assets and balances have different lengths.
    #[error("{assets} source assets but {balances} balances")]
    BalanceCountMismatch {
        /// Number of candidate assets
        assets: usize,
        /// Number of balances
        balances: usize,
    },

    /// The query asked for more hops than the finder allows.
    #[error("path length {requested} exceeds maximum {max}")]
    PathTooLong {
        /// Requested number of hops
        requested: usize,
        /// Configured maximum
        max: usize,
    },

    /// The query listed more candidate assets than the finder allows.
    #[error("{requested} assets exceeds the maximum of {max} per request")]
    TooManyAssets {
        /// Number of candidate assets
        requested: usize,
        /// Configured maximum
        max: usize,
    },

    /// The query amount was zero or negative.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// The query did not name any candidate asset.
    #[error("no candidate assets supplied")]
    NoCandidateAssets,
}

//! Constant-product pool quoting.
//!
//! Fees are expressed in basis points (bps), where 1 bps = 0.01%. All
//! intermediate products are computed on 256-bit integers, so quotes for
//! any pair of 64-bit reserves are exact; a result that does not fit back
//! into a signed 64-bit amount is reported as [`AmmError::Overflow`].

use super::error::AmmError;
use super::pool::MAX_FEE_BPS;
use alloy_primitives::U256;

#[inline]
fn wide(value: i64) -> U256 {
    U256::from(value.unsigned_abs())
}

fn narrow(value: U256) -> Result<i64, AmmError> {
    if value > wide(i64::MAX) {
        return Err(AmmError::Overflow);
    }
    i64::try_from(value.as_limbs()[0]).map_err(|_| AmmError::Overflow)
}

fn check_fee(fee_bps: i32) -> Result<U256, AmmError> {
    if !(0..MAX_FEE_BPS).contains(&fee_bps) {
        return Err(AmmError::InvalidFee { fee_bps });
    }
    Ok(U256::from(u64::from((MAX_FEE_BPS - fee_bps).unsigned_abs())))
}

/// Amount of the output asset paid out for depositing `amount_in`.
///
/// Computes `floor[(1 - F) * reserve_out * amount_in / (reserve_in + (1 - F) * amount_in)]`
/// with `F = fee_bps / 10000`.
///
/// # Errors
/// - [`AmmError::InvalidFee`] when `fee_bps` is outside `0..10000`
/// - [`AmmError::NonPositiveAmount`] for a zero or negative reserve or deposit
/// - [`AmmError::ReserveOverflow`] when the deposit would overflow `reserve_in`
/// - [`AmmError::Overflow`] when the quote does not fit in an `i64`
///
/// # Examples
///
/// ```
/// use orderbook_graph::orderbook::amm::calculate_pool_payout;
///
/// // 1000/1000 reserves, 30 bps fee
/// assert_eq!(calculate_pool_payout(1000, 1000, 500, 30), Ok(332));
/// ```
pub fn calculate_pool_payout(
    reserve_in: i64,
    reserve_out: i64,
    amount_in: i64,
    fee_bps: i32,
) -> Result<i64, AmmError> {
    let fee_multiplier = check_fee(fee_bps)?;
    if reserve_in <= 0 || reserve_out <= 0 || amount_in <= 0 {
        return Err(AmmError::NonPositiveAmount);
    }
    if amount_in > i64::MAX - reserve_in {
        return Err(AmmError::ReserveOverflow {
            reserve_in,
            amount_in,
        });
    }

    let max_bps = U256::from(u64::from(MAX_FEE_BPS.unsigned_abs()));
    let scaled_amount = wide(amount_in)
        .checked_mul(fee_multiplier)
        .ok_or(AmmError::Overflow)?;
    let denominator = wide(reserve_in)
        .checked_mul(max_bps)
        .and_then(|reserve| reserve.checked_add(scaled_amount))
        .ok_or(AmmError::Overflow)?;
    if denominator.is_zero() {
        return Err(AmmError::Overflow);
    }
    let numerator = wide(reserve_out)
        .checked_mul(scaled_amount)
        .ok_or(AmmError::Overflow)?;

    narrow(numerator / denominator)
}

/// Amount of the input asset that must be deposited to receive `amount_out`.
///
/// Computes `ceil[reserve_in * amount_out / ((reserve_out - amount_out) * (1 - F))]`
/// with `F = fee_bps / 10000`.
///
/// # Errors
/// - [`AmmError::InvalidFee`] when `fee_bps` is outside `0..10000`
/// - [`AmmError::NonPositiveAmount`] for a zero or negative reserve or request
/// - [`AmmError::InsufficientReserve`] when `amount_out >= reserve_out`
/// - [`AmmError::ReserveOverflow`] when the required deposit would overflow `reserve_in`
/// - [`AmmError::Overflow`] when the quote does not fit in an `i64`
///
/// # Examples
///
/// ```
/// use orderbook_graph::orderbook::amm::calculate_pool_expectation;
///
/// assert_eq!(calculate_pool_expectation(1000, 1000, 332, 30), Ok(499));
/// assert!(calculate_pool_expectation(1000, 1000, 1000, 30).is_err());
/// ```
pub fn calculate_pool_expectation(
    reserve_in: i64,
    reserve_out: i64,
    amount_out: i64,
    fee_bps: i32,
) -> Result<i64, AmmError> {
    let fee_multiplier = check_fee(fee_bps)?;
    if reserve_in <= 0 || reserve_out <= 0 || amount_out <= 0 {
        return Err(AmmError::NonPositiveAmount);
    }
    if amount_out >= reserve_out {
        return Err(AmmError::InsufficientReserve {
            reserve_out,
            amount_out,
        });
    }

    let max_bps = U256::from(u64::from(MAX_FEE_BPS.unsigned_abs()));
    let numerator = wide(reserve_in)
        .checked_mul(wide(amount_out))
        .and_then(|product| product.checked_mul(max_bps))
        .ok_or(AmmError::Overflow)?;
    let denominator = wide(reserve_out - amount_out)
        .checked_mul(fee_multiplier)
        .ok_or(AmmError::Overflow)?;
    if denominator.is_zero() {
        return Err(AmmError::Overflow);
    }

    let mut quotient = numerator / denominator;
    if !(numerator % denominator).is_zero() {
        quotient = quotient
            .checked_add(U256::from(1u64))
            .ok_or(AmmError::Overflow)?;
    }
    let amount_in = narrow(quotient)?;
    if amount_in > i64::MAX - reserve_in {
        return Err(AmmError::ReserveOverflow {
            reserve_in,
            amount_in,
        });
    }
    Ok(amount_in)
}

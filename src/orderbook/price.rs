//! Rational offer prices and the rounding rules used when crossing offers.

use super::error::PriceError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Price of an offer: `n / d` units of the buying asset per unit of the
/// selling asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Price {
    /// Numerator
    pub n: i32,
    /// Denominator
    pub d: i32,
}

impl Price {
    /// Creates a new price `n / d`.
    #[must_use]
    pub const fn new(n: i32, d: i32) -> Self {
        Self { n, d }
    }

    /// Returns `true` when both components are strictly positive.
    #[must_use]
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.n > 0 && self.d > 0
    }

    /// Returns `true` if `self` requires less of the buying asset per unit
    /// of the selling asset than `other`.
    #[must_use]
    #[inline]
    pub fn cheaper(&self, other: &Price) -> bool {
        self.cmp_value(other) == Ordering::Less
    }

    /// Compares the numeric value of two prices.
    #[must_use]
    #[inline]
    pub fn cmp_value(&self, other: &Price) -> Ordering {
        let left = i64::from(self.n) * i64::from(other.d);
        let right = i64::from(other.n) * i64::from(self.d);
        left.cmp(&right)
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

fn mul_fraction(x: i64, n: i64, d: i64, round_up: bool) -> Result<i64, PriceError> {
    if d == 0 {
        return Err(PriceError::ZeroDenominator);
    }
    if x < 0 || n < 0 || d < 0 {
        return Err(PriceError::NegativeOperand);
    }
    let product = i128::from(x) * i128::from(n);
    let divisor = i128::from(d);
    let mut result = product / divisor;
    if round_up && product % divisor != 0 {
        result += 1;
    }
    i64::try_from(result).map_err(|_| PriceError::Overflow)
}

/// Computes `floor(x * n / d)`.
pub fn mul_fraction_round_down(x: i64, n: i64, d: i64) -> Result<i64, PriceError> {
    mul_fraction(x, n, d, false)
}

/// Computes `ceil(x * n / d)`.
pub fn mul_fraction_round_up(x: i64, n: i64, d: i64) -> Result<i64, PriceError> {
    mul_fraction(x, n, d, true)
}

/// Determines how much can be taken from an offer and what it costs.
///
/// The offer sells `selling_offer_amount` units at price `n / d`. When the
/// price is at most one, the amount that can actually be delivered is first
/// corrected for rounding: `ceil(floor(amount * n / d) * d / n)`.
///
/// Returns `(buying_units, selling_units)`: the amount of the buying asset
/// paid, and the amount of the selling asset extracted, which never exceeds
/// `selling_units_needed`.
pub fn convert_to_buying_units(
    selling_offer_amount: i64,
    selling_units_needed: i64,
    n: i64,
    d: i64,
) -> Result<(i64, i64), PriceError> {
    let mut bound = selling_offer_amount;
    if n <= d {
        bound = mul_fraction_round_down(selling_offer_amount, n, d)?;
        bound = mul_fraction_round_up(bound, d, n)?;
    }
    let selling_units = bound.min(selling_units_needed);
    let buying_units = mul_fraction_round_up(selling_units, n, d)?;
    Ok((buying_units, selling_units))
}

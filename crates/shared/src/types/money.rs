//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Domain arithmetic runs on `rust_decimal::Decimal`; persisted amounts are
//! signed 64-bit minor units (cents). Rounding happens once, at the persisted
//! write, using banker's rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places kept for persisted amounts.
pub const MONEY_SCALE: u32 = 2;

/// Errors converting between decimal amounts and minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount does not fit the persisted minor-unit range.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Rounds an amount to 2 decimal places with banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Converts a decimal amount to minor units, rounding first.
///
/// # Errors
///
/// Returns `MoneyError::OutOfRange` if the amount overflows `i64` cents.
pub fn to_minor(amount: Decimal) -> Result<i64, MoneyError> {
    let mut rounded = round_money(amount);
    rounded.rescale(MONEY_SCALE);
    i64::try_from(rounded.mantissa()).map_err(|_| MoneyError::OutOfRange(amount))
}

/// Converts persisted minor units back into a decimal amount with scale 2.
#[must_use]
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_SCALE)
}

//! Conversions between decimal amounts and the integer cents stored in the database.

use rust_decimal::Decimal;

use crate::Error;

/// The number of decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Convert a decimal amount to integer cents, rounding to [MONEY_SCALE] places.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the amount does not fit in an `i64` once scaled.
pub fn to_cents(amount: Decimal) -> Result<i64, Error> {
    let mut rounded = amount.round_dp(MONEY_SCALE);
    rounded.rescale(MONEY_SCALE);

    i64::try_from(rounded.mantissa()).map_err(|_| Error::AmountOutOfRange(amount))
}

/// Convert integer cents back to a decimal amount with [MONEY_SCALE] places.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

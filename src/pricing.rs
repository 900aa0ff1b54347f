//! Prices

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::cart::CartItem;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalPriceError {
    /// The running total no longer fits in a decimal.
    #[error("total price overflowed")]
    Overflow,
}

/// Price × quantity for a single line.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the multiplication overflows.
pub fn line_total(item: &CartItem) -> Result<Decimal, TotalPriceError> {
    item.product
        .price
        .checked_mul(Decimal::from(item.quantity.get()))
        .ok_or(TotalPriceError::Overflow)
}

/// Calculates the total price of a list of cart lines in the given currency.
///
/// An empty list totals zero.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the sum overflows.
pub fn total_price(
    items: &[CartItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let total = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(line_total(item)?)
            .ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_decimal(total, currency))
}

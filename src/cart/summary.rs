//! Order summary shown alongside the cart.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};

use crate::{cart::Cart, pricing::TotalPriceError};

/// Shipping and tax rules applied on top of the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Decimal,

    /// Flat shipping charge below the threshold.
    pub flat_rate: Decimal,

    /// Sales tax applied to the subtotal, as a fraction.
    pub tax_rate: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(100, 0),
            flat_rate: Decimal::new(999, 2),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

/// Subtotal, shipping, tax and grand total for a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    /// Sum of line totals.
    pub subtotal: Money<'static, Currency>,

    /// Shipping charge (zero once the free shipping threshold is met).
    pub shipping: Money<'static, Currency>,

    /// Tax on the subtotal, rounded to the currency's minor unit.
    pub tax: Money<'static, Currency>,

    /// Subtotal + shipping + tax.
    pub total: Money<'static, Currency>,

    /// How much more must be spent to get free shipping, if anything.
    pub free_shipping_remaining: Option<Money<'static, Currency>>,
}

impl OrderSummary {
    /// Summarise a cart under the default policy.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if any amount overflows.
    pub fn for_cart(
        cart: &Cart,
        currency: &'static Currency,
    ) -> Result<Self, TotalPriceError> {
        Self::with_policy(cart, currency, ShippingPolicy::default())
    }

    /// Summarise a cart under the given policy.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if any amount overflows.
    pub fn with_policy(
        cart: &Cart,
        currency: &'static Currency,
        policy: ShippingPolicy,
    ) -> Result<Self, TotalPriceError> {
        let subtotal = *cart.total_price(currency)?.amount();

        let qualifies = subtotal >= policy.free_shipping_threshold;

        let shipping = if qualifies || cart.is_empty() {
            Decimal::ZERO
        } else {
            policy.flat_rate
        };

        let tax = subtotal
            .checked_mul(policy.tax_rate)
            .ok_or(TotalPriceError::Overflow)?
            .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

        let total = subtotal
            .checked_add(shipping)
            .and_then(|sum| sum.checked_add(tax))
            .ok_or(TotalPriceError::Overflow)?;

        let free_shipping_remaining = (!qualifies).then(|| {
            Money::from_decimal(policy.free_shipping_threshold - subtotal, currency)
        });

        Ok(Self {
            subtotal: Money::from_decimal(subtotal, currency),
            shipping: Money::from_decimal(shipping, currency),
            tax: Money::from_decimal(tax, currency),
            total: Money::from_decimal(total, currency),
            free_shipping_remaining,
        })
    }
}

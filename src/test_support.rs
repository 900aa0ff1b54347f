//! Shared fixtures for unit tests.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    cart::Quantity,
    products::{Product, ProductId},
};

/// A catalog product with the given id and price.
pub(crate) fn product(id: i64, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: None,
        price: Decimal::from_str(price).unwrap_or_else(|_| panic!("invalid price {price}")),
        original_price: None,
        image: None,
        category: Some("Pantry".to_string()),
        brand: None,
        rating: 0.0,
        stock: 10,
    }
}

/// A positive quantity.
pub(crate) fn qty(count: u32) -> Quantity {
    Quantity::new(count).unwrap_or_else(|| panic!("quantity must be positive, got {count}"))
}

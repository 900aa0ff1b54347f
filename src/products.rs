//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<Product>;

/// Category Id
pub type CategoryId = TypedId<Category>;

/// Catalog product, as served by the backend.
///
/// The cart endpoint only embeds `id`, `name`, `price` and `image`, so every
/// other field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Long description
    #[serde(default)]
    pub description: Option<String>,

    /// Current price, in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Pre-discount price, in major units
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Category name
    #[serde(default)]
    pub category: Option<String>,

    /// Brand name
    #[serde(default)]
    pub brand: Option<String>,

    /// Average rating (informational only)
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,

    /// Units in stock
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Product {
    /// Whether the product is sold below its original price.
    pub fn is_discounted(&self) -> bool {
        self.original_price
            .is_some_and(|original| original > self.price)
    }

    /// Amount saved against the original price, if discounted.
    pub fn savings(&self) -> Option<Decimal> {
        self.original_price
            .filter(|original| *original > self.price)
            .map(|original| original - self.price)
    }

    /// Whether any units are available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id
    pub id: CategoryId,

    /// Category name
    pub name: String,
}

//! Cart

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    pricing::{TotalPriceError, total_price},
    products::{Product, ProductId},
};

mod local_id;
mod quantity;
pub mod summary;

pub use local_id::LocalIdGenerator;
pub use quantity::Quantity;

/// Cart Item Id
pub type CartItemId = TypedId<CartItem>;

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Locally generated for anonymous sessions, server-assigned otherwise.
    pub id: CartItemId,

    /// The product this line is for.
    pub product: Product,

    /// How many units.
    pub quantity: Quantity,
}

impl CartItem {
    /// Create a new line.
    pub fn new(id: CartItemId, product: Product, quantity: Quantity) -> Self {
        Self {
            id,
            product,
            quantity,
        }
    }
}

/// An ordered collection of cart lines.
///
/// Serialises as a bare JSON array of items, the same shape the backend returns
/// from `GET /cart` and the shape persisted under the `cart` storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing lines.
    pub fn with_items(items: impl Into<Vec<CartItem>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// The cart lines, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by id.
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up the line referencing a product.
    pub fn item_for_product(&self, product: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product)
    }

    /// Number of lines (not units).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of `product`, accumulating onto an existing line for the
    /// same product when there is one.
    ///
    /// Returns the id of the line that now holds the product.
    pub fn merge_product(
        &mut self,
        product: Product,
        quantity: Quantity,
        ids: &LocalIdGenerator,
    ) -> CartItemId {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);

            return existing.id;
        }

        let id = ids.next_id();

        self.items.push(CartItem::new(id, product, quantity));

        id
    }

    /// Remove the line with the given id. Returns whether a line was removed.
    pub fn remove(&mut self, id: CartItemId) -> bool {
        let before = self.items.len();

        self.items.retain(|item| item.id != id);

        self.items.len() != before
    }

    /// Set the quantity of an existing line. Returns whether the line exists.
    pub fn set_quantity(&mut self, id: CartItemId, quantity: Quantity) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity;

                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Highest id held by any line.
    pub fn max_item_id(&self) -> Option<CartItemId> {
        self.items.iter().map(|item| item.id).max()
    }

    /// Total number of units across all lines.
    pub fn total_item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of price × quantity across all lines.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if the sum overflows.
    pub fn total_price(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, TotalPriceError> {
        total_price(&self.items, currency)
    }
}

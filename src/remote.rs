//! Remote cart service
//!
//! The server-side cart owned by the backend for signed-in users. The HTTP
//! implementation lives on [`crate::api::ApiClient`].

use async_trait::async_trait;
use mockall::automock;

use crate::{
    api::ApiError,
    cart::{Cart, CartItemId, Quantity},
    products::ProductId,
};

/// Operations the cart store needs from the backend.
#[automock]
#[async_trait]
pub trait RemoteCart: Send + Sync {
    /// Fetch the caller's full server-side cart.
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;

    /// Add `quantity` of a product. The server accumulates onto an existing
    /// line for the same product. Does not return the new cart.
    async fn add_item(&self, product: ProductId, quantity: Quantity) -> Result<(), ApiError>;

    /// Remove a cart line.
    async fn remove_item(&self, item: CartItemId) -> Result<(), ApiError>;
}

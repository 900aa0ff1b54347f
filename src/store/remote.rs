//! Signed-in sessions: the server owns the cart.
//!
//! Every change is sent to the backend first and the local cart is only
//! updated from what the server reports back.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    api::ApiError,
    cart::{Cart, CartItemId, Quantity},
    products::Product,
    remote::RemoteCart,
};

use super::{SyncStrategy, errors::Rejection};

pub(crate) struct RemoteSync {
    remote: Arc<dyn RemoteCart>,
}

impl std::fmt::Debug for RemoteSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSync").finish_non_exhaustive()
    }
}

impl RemoteSync {
    pub(crate) fn new(remote: Arc<dyn RemoteCart>) -> Self {
        Self { remote }
    }

    pub(crate) async fn fetch(&self) -> Result<Cart, ApiError> {
        let cart = self.remote.fetch_cart().await?;

        debug!(lines = cart.len(), "fetched server cart");

        Ok(cart)
    }

    /// Turn a failure that happened after the server was already changed into
    /// a rejection carrying the server's current cart, when it can be read.
    async fn after_partial_write(&self, error: ApiError) -> Rejection {
        let server_cart = self
            .fetch()
            .await
            .inspect_err(|source| warn!(error = %source, "failed to re-read cart after partial update"))
            .ok();

        Rejection { error, server_cart }
    }
}

#[async_trait]
impl SyncStrategy for RemoteSync {
    async fn add(
        &self,
        _cart: Cart,
        product: Product,
        quantity: Quantity,
    ) -> Result<Cart, Rejection> {
        self.remote.add_item(product.id, quantity).await?;

        Ok(self.fetch().await?)
    }

    async fn remove(&self, mut cart: Cart, item: CartItemId) -> Result<Cart, Rejection> {
        self.remote.remove_item(item).await?;

        cart.remove(item);

        Ok(cart)
    }

    /// The backend only accumulates or deletes lines, so a decrease is a
    /// delete followed by re-adding the new quantity.
    async fn set_quantity(
        &self,
        cart: Cart,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<Cart, Rejection> {
        let Some((product, current)) = cart
            .item(item)
            .map(|line| (line.product.id, line.quantity))
        else {
            return Ok(cart);
        };

        if quantity == current {
            return Ok(cart);
        }

        if quantity > current {
            let delta = Quantity::new(quantity.get() - current.get()).unwrap_or(Quantity::ONE);

            self.remote.add_item(product, delta).await?;

            return Ok(self.fetch().await?);
        }

        self.remote.remove_item(item).await?;

        if let Err(error) = self.remote.add_item(product, quantity).await {
            return Err(self.after_partial_write(error).await);
        }

        Ok(self.fetch().await?)
    }

    async fn clear(&self, cart: Cart) -> Result<Cart, Rejection> {
        if cart.is_empty() {
            return Ok(cart);
        }

        for (removed, line) in cart.items().iter().enumerate() {
            if let Err(error) = self.remote.remove_item(line.id).await {
                if removed == 0 {
                    return Err(error.into());
                }

                return Err(self.after_partial_write(error).await);
            }
        }

        Ok(self.fetch().await?)
    }
}

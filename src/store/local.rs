//! Anonymous sessions: the cart lives only on this device.

use async_trait::async_trait;

use crate::{
    cart::{Cart, CartItemId, LocalIdGenerator, Quantity},
    products::Product,
};

use super::{SyncStrategy, errors::Rejection};

/// Applies every change to the local cart and never fails.
#[derive(Debug)]
pub(crate) struct LocalSync {
    ids: LocalIdGenerator,
}

impl LocalSync {
    pub(crate) fn new(ids: LocalIdGenerator) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl SyncStrategy for LocalSync {
    async fn add(
        &self,
        mut cart: Cart,
        product: Product,
        quantity: Quantity,
    ) -> Result<Cart, Rejection> {
        cart.merge_product(product, quantity, &self.ids);

        Ok(cart)
    }

    async fn remove(&self, mut cart: Cart, item: CartItemId) -> Result<Cart, Rejection> {
        cart.remove(item);

        Ok(cart)
    }

    async fn set_quantity(
        &self,
        mut cart: Cart,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<Cart, Rejection> {
        cart.set_quantity(item, quantity);

        Ok(cart)
    }

    async fn clear(&self, _cart: Cart) -> Result<Cart, Rejection> {
        Ok(Cart::new())
    }
}

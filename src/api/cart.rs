//! Cart endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::{
    api::{ApiClient, ApiError},
    cart::{Cart, CartItemId, Quantity},
    products::ProductId,
    remote::RemoteCart,
};

#[derive(Debug, Serialize)]
struct AddToCartRequest {
    product_id: ProductId,
    quantity: Quantity,
}

#[async_trait]
impl RemoteCart for ApiClient {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.send_json(self.request(Method::GET, "cart")).await
    }

    async fn add_item(&self, product: ProductId, quantity: Quantity) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id: product,
            quantity,
        };

        self.send_empty(self.request(Method::POST, "cart").json(&body))
            .await
    }

    async fn remove_item(&self, item: CartItemId) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("cart/{item}")))
            .await
    }
}

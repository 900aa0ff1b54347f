//! Storefront
//!
//! Client-side state for the storefront: the shopping cart with its local
//! mirror and server synchronisation, catalog browsing, sign-in sessions and
//! the admin console API.
//!
//! The centre of the crate is [`store::CartStore`]. It keeps the cart in
//! memory, writes every change to [`storage::KeyValueStorage`], and when the
//! session is signed in sends changes through [`remote::RemoteCart`] first.

pub mod api;
pub mod auth;
pub mod cart;
pub mod ids;
pub mod pricing;
pub mod products;
pub mod remote;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ApiConfig, ApiError};
pub use auth::{AuthStatus, StaticToken, StoredToken};
pub use cart::{Cart, CartItem, CartItemId, Quantity};
pub use products::{Category, CategoryId, Product, ProductId};
pub use remote::RemoteCart;
pub use session::{SessionManager, User};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CartStore, CartStoreDeps, CartStoreError, SyncMode};

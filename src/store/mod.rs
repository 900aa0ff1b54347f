//! Cart store
//!
//! Holds the session's cart in memory and keeps it mirrored to durable
//! storage. Anonymous sessions change the cart locally. Signed-in sessions
//! send every change to the backend and adopt the server's cart afterwards.
//! The mode is decided per call by asking [`AuthStatus`], so signing in or out
//! takes effect on the next operation without rebuilding the store.
//!
//! Mutations are queued: at most one runs at a time, including its awaited
//! remote calls, and later callers wait their turn in arrival order. Queries
//! never wait on the queue.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use rusty_money::{Money, iso::Currency};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    auth::AuthStatus,
    cart::{Cart, CartItem, CartItemId, LocalIdGenerator, Quantity, summary::OrderSummary},
    pricing::TotalPriceError,
    products::Product,
    remote::RemoteCart,
    storage::{KeyValueStorage, read_snapshot, write_snapshot},
};

mod errors;
mod local;
mod remote;

pub use errors::CartStoreError;

use errors::Rejection;
use local::LocalSync;
use remote::RemoteSync;

/// How a mutation is applied.
#[async_trait]
pub(crate) trait SyncStrategy: Send + Sync {
    async fn add(&self, cart: Cart, product: Product, quantity: Quantity)
    -> Result<Cart, Rejection>;

    async fn remove(&self, cart: Cart, item: CartItemId) -> Result<Cart, Rejection>;

    async fn set_quantity(
        &self,
        cart: Cart,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<Cart, Rejection>;

    async fn clear(&self, cart: Cart) -> Result<Cart, Rejection>;
}

/// Where mutations are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Anonymous: this device only.
    Local,

    /// Signed in: the backend owns the cart.
    Remote,
}

/// Collaborators of a [`CartStore`].
#[derive(Clone)]
pub struct CartStoreDeps {
    /// Durable mirror of the cart.
    pub storage: Arc<dyn KeyValueStorage>,

    /// Decides between local and remote mode.
    pub auth: Arc<dyn AuthStatus>,

    /// Server-side cart for signed-in sessions.
    pub remote: Arc<dyn RemoteCart>,

    /// Currency prices are expressed in.
    pub currency: &'static Currency,
}

impl std::fmt::Debug for CartStoreDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStoreDeps")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

/// The session's cart.
pub struct CartStore {
    cart: RwLock<Cart>,
    queue: Mutex<()>,
    storage: Arc<dyn KeyValueStorage>,
    auth: Arc<dyn AuthStatus>,
    local: LocalSync,
    remote: RemoteSync,
    currency: &'static Currency,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Start a session.
    ///
    /// Adopts the stored snapshot (an unreadable one counts as an empty cart),
    /// then, when signed in, replaces it with the server's cart. A failed fetch
    /// is logged and the local cart kept. Opening never fails.
    pub async fn open(deps: CartStoreDeps) -> Self {
        let CartStoreDeps {
            storage,
            auth,
            remote,
            currency,
        } = deps;

        let cart = read_snapshot(storage.as_ref());

        let ids = cart
            .max_item_id()
            .map_or_else(LocalIdGenerator::new, LocalIdGenerator::starting_after);

        let store = Self {
            cart: RwLock::new(cart),
            queue: Mutex::new(()),
            storage,
            auth,
            local: LocalSync::new(ids),
            remote: RemoteSync::new(remote),
            currency,
        };

        if store.mode() == SyncMode::Remote
            && let Err(error) = store.refresh().await
        {
            warn!(error = %error.api_error(), "initial cart fetch failed, keeping local cart");
        }

        store
    }

    /// Replace the cart with the server's, e.g. after signing in.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the fetch fails; the cart is unchanged.
    pub async fn refresh(&self) -> Result<(), CartStoreError> {
        let _turn = self.queue.lock().await;

        let cart = self.remote.fetch().await?;

        self.replace(cart);

        Ok(())
    }

    /// Add `quantity` of `product`.
    ///
    /// # Errors
    ///
    /// Signed-in only: returns a [`CartStoreError`] if the server rejects the
    /// change or the cart cannot be re-read; the cart is unchanged.
    pub async fn add(&self, product: Product, quantity: Quantity) -> Result<(), CartStoreError> {
        let _turn = self.queue.lock().await;

        debug!(product = %product.id, quantity = %quantity, "adding to cart");

        let outcome = self
            .strategy()
            .add(self.cart(), product, quantity)
            .await;

        self.settle("add", outcome)
    }

    /// Remove a line. Unknown ids are ignored locally.
    ///
    /// # Errors
    ///
    /// Signed-in only: returns a [`CartStoreError`] if the server rejects the
    /// removal; the cart is unchanged.
    pub async fn remove(&self, item: CartItemId) -> Result<(), CartStoreError> {
        let _turn = self.queue.lock().await;

        debug!(item = %item, "removing from cart");

        let outcome = self.strategy().remove(self.cart(), item).await;

        self.settle("remove", outcome)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Signed-in only: returns a [`CartStoreError`] if the server rejects the
    /// change. If the server was changed before the failure, the store adopts
    /// the server's cart as it now stands.
    pub async fn update_quantity(
        &self,
        item: CartItemId,
        quantity: i64,
    ) -> Result<(), CartStoreError> {
        let Some(quantity) = Quantity::from_signed(quantity) else {
            return self.remove(item).await;
        };

        let _turn = self.queue.lock().await;

        debug!(item = %item, quantity = %quantity, "updating cart quantity");

        let outcome = self
            .strategy()
            .set_quantity(self.cart(), item, quantity)
            .await;

        self.settle("update_quantity", outcome)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Signed-in only: returns a [`CartStoreError`] if a removal fails. Lines
    /// removed before the failure stay removed.
    pub async fn clear(&self) -> Result<(), CartStoreError> {
        let _turn = self.queue.lock().await;

        debug!("clearing cart");

        let outcome = self.strategy().clear(self.cart()).await;

        self.settle("clear", outcome)
    }

    /// Where mutations go right now.
    pub fn mode(&self) -> SyncMode {
        if self.auth.is_authenticated() {
            SyncMode::Remote
        } else {
            SyncMode::Local
        }
    }

    /// Currency prices are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// A snapshot of the cart.
    pub fn cart(&self) -> Cart {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The cart lines, in order.
    pub fn items(&self) -> Vec<CartItem> {
        self.read(|cart| cart.items().to_vec())
    }

    /// Look up a line.
    pub fn item(&self, item: CartItemId) -> Option<CartItem> {
        self.read(|cart| cart.item(item).cloned())
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.read(Cart::is_empty)
    }

    /// Total units across all lines.
    pub fn total_item_count(&self) -> u64 {
        self.read(Cart::total_item_count)
    }

    /// Sum of price × quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the sum overflows.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        self.read(|cart| cart.total_price(self.currency))
    }

    /// Subtotal, shipping, tax and total for checkout.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if any amount overflows.
    pub fn summary(&self) -> Result<OrderSummary, TotalPriceError> {
        self.read(|cart| OrderSummary::for_cart(cart, self.currency))
    }

    fn read<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.cart.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn strategy(&self) -> &dyn SyncStrategy {
        match self.mode() {
            SyncMode::Local => &self.local,
            SyncMode::Remote => &self.remote,
        }
    }

    fn settle(
        &self,
        operation: &'static str,
        outcome: Result<Cart, Rejection>,
    ) -> Result<(), CartStoreError> {
        match outcome {
            Ok(cart) => {
                self.replace(cart);

                Ok(())
            }
            Err(Rejection { error, server_cart }) => {
                warn!(operation, error = %error, "cart change rejected, keeping last known cart");

                if let Some(cart) = server_cart {
                    self.replace(cart);
                }

                Err(error.into())
            }
        }
    }

    fn replace(&self, cart: Cart) {
        if let Err(source) = write_snapshot(self.storage.as_ref(), &cart) {
            warn!(error = %source, "failed to persist cart snapshot");
        }

        *self.cart.write().unwrap_or_else(PoisonError::into_inner) = cart;
    }
}

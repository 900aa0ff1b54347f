//! Durable key-value storage
//!
//! [`KeyValueStorage`] maps string keys to string values that survive
//! restarts. The cart store treats it as a passive mirror.

use std::sync::PoisonError;

use thiserror::Error;
use tracing::warn;

use crate::cart::Cart;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage key constants.
pub mod keys {
    /// Serialised cart snapshot.
    pub const CART: &str = "cart";

    /// Bearer token; its presence marks the session as authenticated.
    pub const TOKEN: &str = "token";

    /// Serialised signed-in user.
    pub const USER: &str = "user";

    /// Admin console shared secret.
    pub const ADMIN_SECRET: &str = "admin_secret";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error")]
    Io(#[from] std::io::Error),

    /// The backing file or a value could not be (de)serialised.
    #[error("storage serialisation error")]
    Serde(#[from] serde_json::Error),

    /// Another thread panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// String key-value storage that survives restarts.
pub trait KeyValueStorage: Send + Sync {
    /// Load the value stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read the cart snapshot.
///
/// A missing snapshot, an unreadable backend and an unparseable snapshot all
/// yield an empty cart; the latter two are logged.
pub fn read_snapshot(storage: &dyn KeyValueStorage) -> Cart {
    let raw = match storage.load(keys::CART) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(source) => {
            warn!(error = %source, "failed to read saved cart, starting empty");

            return Cart::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(cart) => cart,
        Err(source) => {
            warn!(error = %source, "failed to parse saved cart, starting empty");

            Cart::new()
        }
    }
}

/// Write the cart snapshot.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialised or stored.
pub fn write_snapshot(storage: &dyn KeyValueStorage, cart: &Cart) -> Result<(), StorageError> {
    let raw = serde_json::to_string(cart)?;

    storage.save(keys::CART, &raw)
}

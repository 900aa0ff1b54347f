//! Cart store errors.

use thiserror::Error;

use crate::{api::ApiError, cart::Cart};

/// Errors reported by cart store mutations.
///
/// Every failure leaves the store holding its last known good cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// A call to the remote cart service failed.
    #[error("remote cart call failed")]
    Remote(#[from] ApiError),
}

impl CartStoreError {
    /// The underlying API error.
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::Remote(error) => error,
        }
    }
}

/// A failed strategy step.
///
/// `server_cart` is set when the server may already have been changed before
/// the failure and a fresh copy of its cart could be fetched.
#[derive(Debug, Error)]
#[error("{error}")]
pub(crate) struct Rejection {
    #[source]
    pub(crate) error: ApiError,
    pub(crate) server_cart: Option<Cart>,
}

impl From<ApiError> for Rejection {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            server_cart: None,
        }
    }
}

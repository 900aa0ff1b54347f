//! Authentication status
//!
//! The cart store asks an [`AuthStatus`] on every call whether the session is
//! signed in. The answer is never cached, so signing in or out takes effect on
//! the next operation.

use std::sync::Arc;

use mockall::automock;
use tracing::warn;

use crate::storage::{KeyValueStorage, keys};

/// Source of the session's bearer credential.
#[automock]
pub trait AuthStatus: Send + Sync {
    /// The current bearer token, if signed in.
    fn token(&self) -> Option<String>;

    /// Whether the session is signed in.
    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Reads the `token` key from storage at call time.
#[derive(Clone)]
pub struct StoredToken {
    storage: Arc<dyn KeyValueStorage>,
}

impl StoredToken {
    /// Read tokens from the given storage.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken").finish_non_exhaustive()
    }
}

impl AuthStatus for StoredToken {
    fn token(&self) -> Option<String> {
        match self.storage.load(keys::TOKEN) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(source) => {
                warn!(error = %source, "failed to read token, treating session as anonymous");

                None
            }
        }
    }
}

/// A fixed answer, for hosts that manage credentials themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// An anonymous session.
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// A session signed in with `token`.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }
}

impl AuthStatus for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

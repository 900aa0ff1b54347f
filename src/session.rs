//! Sign-in session
//!
//! Signing in stores the bearer token under the `token` key, which is what
//! flips the cart store into server-synchronised mode. Signing out removes it
//! again but leaves the local cart mirror in place.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{AdminClient, ApiClient, ApiError},
    ids::TypedId,
    storage::{KeyValueStorage, StorageError, keys},
};

/// User Id
pub type UserId = TypedId<User>;

/// A storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,

    /// The signed-in user.
    pub user: User,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Errors raised while changing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend rejected the request.
    #[error("authentication request failed")]
    Api(#[from] ApiError),

    /// Credentials could not be persisted.
    #[error("failed to persist session")]
    Storage(#[from] StorageError),

    /// The stored user could not be serialised.
    #[error("failed to serialise user")]
    Serde(#[from] serde_json::Error),
}

/// Signs users in and out and keeps their credentials in storage.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a session manager.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { api, storage }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] (wrapped) for bad credentials, or an
    /// error if the request fails or the token cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let response: AuthResponse = self
            .api
            .send_json(
                self.api
                    .request(Method::POST, "auth/login")
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        self.establish(response)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] (wrapped) for an already registered email,
    /// or an error if the request fails or the token cannot be stored.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let response: AuthResponse = self
            .api
            .send_json(
                self.api
                    .request(Method::POST, "auth/register")
                    .json(&RegisterRequest {
                        name,
                        email,
                        password,
                    }),
            )
            .await?;

        self.establish(response)
    }

    fn establish(&self, response: AuthResponse) -> Result<User, SessionError> {
        let user = serde_json::to_string(&response.user)?;

        self.storage.save(keys::TOKEN, &response.access_token)?;
        self.storage.save(keys::USER, &user)?;

        info!(user = %response.user.id, "signed in");

        Ok(response.user)
    }

    /// Sign out. The local cart mirror is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be removed from storage.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.storage.remove(keys::TOKEN)?;
        self.storage.remove(keys::USER)?;

        info!("signed out");

        Ok(())
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage.load(keys::USER) {
            Ok(raw) => raw?,
            Err(source) => {
                warn!(error = %source, "failed to read stored user");

                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|source| warn!(error = %source, "failed to parse stored user"))
            .ok()
    }

    /// Remember the admin console secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be stored.
    pub fn set_admin_secret(&self, secret: &str) -> Result<(), SessionError> {
        self.storage.save(keys::ADMIN_SECRET, secret)?;

        Ok(())
    }

    /// Forget the admin console secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be removed.
    pub fn clear_admin_secret(&self) -> Result<(), SessionError> {
        self.storage.remove(keys::ADMIN_SECRET)?;

        Ok(())
    }

    /// An admin client using the stored secret, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn admin(&self) -> Result<Option<AdminClient>, SessionError> {
        Ok(self
            .storage
            .load(keys::ADMIN_SECRET)?
            .filter(|secret| !secret.is_empty())
            .map(|secret| self.api.admin(secret)))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::ApiConfig,
        auth::{AuthStatus, StoredToken},
        storage::MemoryStorage,
    };

    use super::*;

    fn session() -> (SessionManager, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let api = ApiClient::new(
            ApiConfig::default(),
            Arc::new(StoredToken::new(storage.clone())),
        );

        (SessionManager::new(api, storage.clone()), storage)
    }

    fn response() -> AuthResponse {
        AuthResponse {
            access_token: "jwt".to_string(),
            user: User {
                id: UserId::new(7),
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            },
        }
    }

    #[test]
    fn establishing_stores_token_and_user() -> TestResult {
        let (session, storage) = session();

        let user = session.establish(response())?;

        assert_eq!(storage.load(keys::TOKEN)?.as_deref(), Some("jwt"));
        assert_eq!(session.current_user(), Some(user));
        assert!(StoredToken::new(storage).is_authenticated());

        Ok(())
    }

    #[test]
    fn logout_keeps_cart_mirror() -> TestResult {
        let (session, storage) = session();

        storage.save(keys::CART, "[]")?;
        session.establish(response())?;
        session.logout()?;

        assert_eq!(storage.load(keys::TOKEN)?, None);
        assert_eq!(session.current_user(), None);
        assert_eq!(storage.load(keys::CART)?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn corrupt_stored_user_reads_as_none() -> TestResult {
        let (session, storage) = session();

        storage.save(keys::USER, "{")?;

        assert_eq!(session.current_user(), None);

        Ok(())
    }

    #[test]
    fn admin_client_requires_secret() -> TestResult {
        let (session, _storage) = session();

        assert!(session.admin()?.is_none());

        session.set_admin_secret("adminsecret")?;
        assert!(session.admin()?.is_some());

        session.clear_admin_secret()?;
        assert!(session.admin()?.is_none());

        Ok(())
    }

    #[test]
    fn decodes_auth_response() -> TestResult {
        let parsed: AuthResponse = serde_json::from_str(
            r#"{"access_token": "jwt", "user": {"id": 7, "email": "ada@example.com", "name": "Ada"}}"#,
        )?;

        assert_eq!(parsed, response());

        Ok(())
    }
}

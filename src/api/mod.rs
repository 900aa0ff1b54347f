//! Storefront backend REST client.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::AuthStatus;

mod admin;
mod cart;
mod catalog;
mod errors;

pub use admin::*;
pub use catalog::*;
pub use errors::ApiError;

/// Default backend address used by the storefront in development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

/// Configuration for connecting to the storefront backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix, e.g. `"http://localhost:5001/api"`.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// HTTP client for the storefront backend.
///
/// Attaches `Authorization: Bearer <token>` to every request while the
/// [`AuthStatus`] reports a token.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
    auth: Arc<dyn AuthStatus>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: ApiConfig, auth: Arc<dyn AuthStatus>) -> Self {
        Self {
            config,
            http: Client::new(),
            auth,
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);

        debug!(%method, %url, "api request");

        let builder = self.http.request(method, url);

        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = check(builder.send().await?).await?;
        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        check(builder.send().await?).await?;

        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(ApiError::from_response(status, &body))
}

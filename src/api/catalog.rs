//! Catalog endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiClient, ApiError},
    products::{Category, Product, ProductId},
};

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    /// 1-based page number (backend default 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size (backend default 12).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// Exact category name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Substring of the product name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProductQuery {
    /// Restrict to a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Search product names.
    #[must_use]
    pub fn matching(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Select a page.
    #[must_use]
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,

    /// Total matching products.
    pub total: u64,

    /// Total pages.
    pub pages: u32,

    /// The page returned.
    pub current_page: u32,
}

impl ProductPage {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.pages
    }
}

impl ApiClient {
    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        self.send_json(self.request(Method::GET, "products").query(query))
            .await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or an error on HTTP
    /// failure or an unexpected response body.
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.send_json(self.request(Method::GET, &format!("products/{id}")))
            .await
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send_json(self.request(Method::GET, "categories")).await
    }
}

//! Admin console endpoints.
//!
//! Guarded by a shared secret sent as `X-ADMIN-SECRET` rather than by the
//! user's bearer token.

use jiff::civil::DateTime;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiClient, ApiError},
    ids::TypedId,
    products::{Category, CategoryId, ProductId},
    session::UserId,
};

const ADMIN_SECRET_HEADER: &str = "X-ADMIN-SECRET";

/// Order Id
pub type OrderId = TypedId<Order>;

/// New category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    /// Unique name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial category update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// New product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    /// Product name.
    pub name: String,

    /// Current price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Pre-discount price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub original_price: Option<Decimal>,

    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Category, by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    /// Category, by name (used when no id is given).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    /// Brand name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Initial rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Units in stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl NewProduct {
    /// A product with only the required fields set.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            original_price: None,
            description: None,
            image: None,
            category_id: None,
            category_name: None,
            brand: None,
            rating: None,
            stock: None,
        }
    }
}

/// Partial product update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,

    /// New pre-discount price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub original_price: Option<Decimal>,

    /// New image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// New brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// New rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// New stock count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,

    /// Move to another category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// Product reference returned by product writes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRef {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    /// Order id
    pub id: OrderId,

    /// Customer
    pub user_id: UserId,

    /// Order total
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Fulfilment status, e.g. `"pending"`
    pub status: String,

    /// Shipping address
    #[serde(default)]
    pub shipping_address: Option<String>,

    /// Creation time (server local, no offset)
    pub created_at: DateTime,
}

/// Aggregate sales figures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesSummary {
    /// Sum of all order totals
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,

    /// Number of orders
    pub order_count: u64,
}

/// Client for admin endpoints.
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
    secret: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Admin client authenticating with the given shared secret.
    #[must_use]
    pub fn admin(&self, secret: impl Into<String>) -> AdminClient {
        AdminClient {
            api: self.clone(),
            secret: secret.into(),
        }
    }
}

impl AdminClient {
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.api
            .request(method, path)
            .header(ADMIN_SECRET_HEADER, self.secret.as_str())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with status 400 for a duplicate or missing
    /// name, [`ApiError::Unauthorized`] for a wrong secret, or an error on HTTP
    /// failure.
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        self.api
            .send_json(self.request(Method::POST, "categories").json(category))
            .await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or an error on HTTP
    /// failure.
    pub async fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        self.api
            .send_json(
                self.request(Method::PATCH, &format!("categories/{id}"))
                    .json(update),
            )
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or an error on HTTP
    /// failure.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.api
            .send_empty(self.request(Method::DELETE, &format!("categories/{id}")))
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with status 400 when name or price is
    /// missing, or an error on HTTP failure.
    pub async fn create_product(&self, product: &NewProduct) -> Result<ProductRef, ApiError> {
        self.api
            .send_json(self.request(Method::POST, "products").json(product))
            .await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or an error on HTTP
    /// failure.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<ProductRef, ApiError> {
        self.api
            .send_json(
                self.request(Method::PATCH, &format!("products/{id}"))
                    .json(update),
            )
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or an error on HTTP
    /// failure.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.api
            .send_empty(self.request(Method::DELETE, &format!("products/{id}")))
            .await
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.api
            .send_json(self.request(Method::GET, "orders"))
            .await
    }

    /// Sales totals.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn sales(&self) -> Result<SalesSummary, ApiError> {
        self.api
            .send_json(self.request(Method::GET, "sales"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_product_serialises_only_set_fields() -> TestResult {
        let mut product = NewProduct::new("Organic Quinoa", Decimal::new(999, 2));
        product.category_name = Some("Pantry".to_string());
        product.stock = Some(28);

        assert_eq!(
            serde_json::to_value(&product)?,
            serde_json::json!({
                "name": "Organic Quinoa",
                "price": 9.99,
                "category_name": "Pantry",
                "stock": 28
            })
        );

        Ok(())
    }

    #[test]
    fn empty_update_serialises_to_empty_object() -> TestResult {
        assert_eq!(
            serde_json::to_value(ProductUpdate::default())?,
            serde_json::json!({})
        );
        assert_eq!(
            serde_json::to_value(CategoryUpdate::default())?,
            serde_json::json!({})
        );

        Ok(())
    }

    #[test]
    fn decodes_orders_and_sales() -> TestResult {
        let orders: Vec<Order> = serde_json::from_str(
            r#"[{
                "id": 1,
                "user_id": 3,
                "total_amount": 42.5,
                "status": "pending",
                "shipping_address": null,
                "created_at": "2024-05-01T10:15:30.123456"
            }]"#,
        )?;

        let sales: SalesSummary =
            serde_json::from_str(r#"{"total_sales": 42.5, "order_count": 1}"#)?;

        assert_eq!(orders.first().map(|order| order.status.as_str()), Some("pending"));
        assert_eq!(sales.total_sales, Decimal::new(425, 1));
        assert_eq!(sales.order_count, 1);

        Ok(())
    }
}

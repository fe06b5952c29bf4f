//! Remote recommendation service client.
//!
//! # Wire contract
//!
//! - `GET /recommendations/product/{id}?limit=n`
//! - `GET /recommendations/user/{id}?limit=n`
//!
//! Both return a raw JSON array of product-shaped objects (no envelope).
//! Recommendations are a non-critical enhancement: callers catch every
//! [`GatewayError`] and degrade instead of failing the surrounding lookup.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use greengrocer_core::{CustomerId, Product, ProductId};

use super::GatewayError;
use crate::assets;
use crate::config::RecommendationConfig;

// =============================================================================
// RecommendationApi trait
// =============================================================================

/// Operations of the remote recommendation service.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    /// Products related to a given product.
    async fn related_to_product(
        &self,
        product_id: ProductId,
        limit: usize,
    ) -> Result<Vec<Product>, GatewayError>;

    /// Personalized picks for a customer.
    async fn picks_for_customer(
        &self,
        customer_id: CustomerId,
        limit: usize,
    ) -> Result<Vec<Product>, GatewayError>;
}

// =============================================================================
// Wire types
// =============================================================================

/// A product as the recommendation service sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Decimal string, e.g. `"3.99"`.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub max_quantity: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn convert_products(raw: Vec<RemoteProduct>) -> Vec<Product> {
    raw.into_iter().filter_map(convert_product).collect()
}

fn convert_product(raw: RemoteProduct) -> Option<Product> {
    let id = raw.id.filter(|id| *id > 0)?;
    let price = raw.price.filter(|price| *price > Decimal::ZERO)?;

    Some(Product {
        id: ProductId::new(id),
        name: raw.name.unwrap_or_default(),
        price,
        discount_percent: raw.discount_percent.unwrap_or(0).min(100),
        max_quantity: raw.max_quantity.unwrap_or(99).max(1),
        image: raw
            .image
            .unwrap_or_else(|| assets::PLACEHOLDER_IMAGE.to_string()),
        category: raw.category,
    })
}

// =============================================================================
// HttpRecommendationApi
// =============================================================================

/// `reqwest`-backed recommendation service client.
///
/// Requests carry a short bounded timeout (3 seconds by default) - a slow
/// recommendation backend must never hold up the surrounding page.
pub struct HttpRecommendationApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRecommendationApi {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &RecommendationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            timeout: config.timeout,
        }
    }

    async fn fetch(&self, url: String, limit: usize) -> Result<Vec<Product>, GatewayError> {
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let raw: Vec<RemoteProduct> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let products = convert_products(raw);
        if products.is_empty() {
            warn!(url = %url, "recommendation service returned no usable products");
        }
        Ok(products)
    }
}

#[async_trait]
impl RecommendationApi for HttpRecommendationApi {
    async fn related_to_product(
        &self,
        product_id: ProductId,
        limit: usize,
    ) -> Result<Vec<Product>, GatewayError> {
        let url = format!("{}/recommendations/product/{product_id}", self.base_url);
        self.fetch(url, limit).await
    }

    async fn picks_for_customer(
        &self,
        customer_id: CustomerId,
        limit: usize,
    ) -> Result<Vec<Product>, GatewayError> {
        let url = format!("{}/recommendations/user/{customer_id}", self.base_url);
        self.fetch(url, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_drops_products_without_id_or_price() {
        let raw: Vec<RemoteProduct> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Apples", "price": "2.99"},
                {"name": "No Id", "price": "1.00"},
                {"id": 3, "name": "Free?", "price": "0"},
                {"id": 4, "name": "Olive Oil", "price": "8.50"}
            ]"#,
        )
        .unwrap();

        let products = convert_products(raw);
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_convert_fills_missing_image_with_placeholder() {
        let products = convert_products(vec![RemoteProduct {
            id: Some(2),
            name: Some("Butter".to_string()),
            price: Some(Decimal::new(499, 2)),
            ..RemoteProduct::default()
        }]);
        assert_eq!(products.first().unwrap().image, assets::PLACEHOLDER_IMAGE);
    }
}

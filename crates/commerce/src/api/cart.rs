//! Remote cart service client.
//!
//! # Wire contract
//!
//! - `GET /cart` - current cart
//! - `POST /cart/items {productId, quantity}` - add a product
//! - `PUT /cart/{itemId} {quantity}` - change a line's quantity
//! - `DELETE /cart/{itemId}` - remove a line
//! - `DELETE /cart` - clear the cart
//!
//! Every response body is the envelope `{success, data|null, error?}`;
//! the HTTP status is inspected as well (2xx = success). Monetary amounts
//! travel as decimal strings to preserve precision.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::warn;

use greengrocer_core::{LineId, LineItem, ProductId};

use super::{ApiOutcome, GatewayError};
use crate::assets;
use crate::config::CartApiConfig;

/// Purchase limit applied when the service omits one.
const DEFAULT_MAX_QUANTITY: u32 = 99;

// =============================================================================
// CartApi trait
// =============================================================================

/// Operations of the remote cart service.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the full cart.
    async fn get_cart(&self) -> Result<ApiOutcome<RemoteCart>, GatewayError>;

    /// Add `quantity` units of a product.
    async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<ApiOutcome<()>, GatewayError>;

    /// Set a line's quantity.
    async fn update_item(
        &self,
        item_id: &LineId,
        quantity: u32,
    ) -> Result<ApiOutcome<()>, GatewayError>;

    /// Remove a line.
    async fn remove_item(&self, item_id: &LineId) -> Result<ApiOutcome<()>, GatewayError>;

    /// Clear the whole cart.
    async fn clear_cart(&self) -> Result<ApiOutcome<()>, GatewayError>;
}

// =============================================================================
// Wire types
// =============================================================================

/// Response envelope shared by all cart endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Cart payload as returned by `GET /cart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCart {
    /// Line items; missing field reads as empty.
    #[serde(default)]
    pub items: Vec<RemoteLine>,
}

/// A line item as the service sends it.
///
/// Every field is optional: the API occasionally returns partially populated
/// lines, and ingest filtering (not deserialization) decides what to keep.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLine {
    /// Service-assigned line identifier, numeric or string.
    #[serde(default)]
    pub id: Option<RemoteLineId>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Decimal string, e.g. `"3.99"`.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub max_quantity: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Line identifiers arrive as either JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemoteLineId {
    /// Numeric identifier.
    Int(i64),
    /// String identifier.
    Text(String),
}

impl RemoteLineId {
    fn into_line_id(self) -> LineId {
        match self {
            Self::Int(id) => LineId::new(id.to_string()),
            Self::Text(id) => LineId::new(id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    product_id: i64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateItemBody {
    quantity: u32,
}

// =============================================================================
// Wire -> domain conversion
// =============================================================================

/// Convert a remote cart snapshot into domain line items.
///
/// Lines missing a positive product id or unit price (or otherwise failing
/// validation) are dropped with a warning - a partially populated API
/// response degrades the snapshot, it never errors.
#[must_use]
pub fn convert_cart(cart: RemoteCart) -> Vec<LineItem> {
    cart.items.into_iter().filter_map(convert_line).collect()
}

fn convert_line(raw: RemoteLine) -> Option<LineItem> {
    let Some(id) = raw.id else {
        warn!("dropping remote cart line without an id");
        return None;
    };

    let max_quantity = raw.max_quantity.unwrap_or(DEFAULT_MAX_QUANTITY).max(1);
    let item = LineItem {
        id: id.into_line_id(),
        product_id: ProductId::new(raw.product_id.unwrap_or(0)),
        name: raw.name.unwrap_or_default(),
        quantity: raw.quantity.unwrap_or(1).clamp(1, max_quantity),
        unit_price: raw.unit_price.unwrap_or(Decimal::ZERO),
        discount_percent: raw.discount_percent.unwrap_or(0).min(100),
        max_quantity,
        image: raw
            .image
            .unwrap_or_else(|| assets::PLACEHOLDER_IMAGE.to_string()),
    };

    if let Err(e) = item.validate() {
        warn!(line = %item.id, error = %e, "dropping malformed remote cart line");
        return None;
    }

    Some(item)
}

// =============================================================================
// HttpCartApi
// =============================================================================

/// `reqwest`-backed cart service client.
pub struct HttpCartApi {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpCartApi {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &CartApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_token: config.exposed_token(),
            timeout: config.timeout,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.timeout(self.timeout);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_envelope<T: DeserializeOwned + Default>(
        response: reqwest::Response,
    ) -> Result<ApiOutcome<Envelope<T>>, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Prefer the service's own error message when the body still
            // carries an envelope.
            let error = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Ok(ApiOutcome::Failure {
                error,
                status: Some(status.as_u16()),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        if !envelope.success {
            return Ok(ApiOutcome::Failure {
                error: envelope
                    .error
                    .unwrap_or_else(|| "request failed".to_string()),
                status: Some(status.as_u16()),
            });
        }

        Ok(ApiOutcome::Success(envelope))
    }

    async fn read_data<T: DeserializeOwned + Default>(
        response: reqwest::Response,
    ) -> Result<ApiOutcome<T>, GatewayError> {
        match Self::read_envelope::<T>(response).await? {
            ApiOutcome::Success(envelope) => match envelope.data {
                Some(data) => Ok(ApiOutcome::Success(data)),
                None => Ok(ApiOutcome::Failure {
                    error: "response missing data".to_string(),
                    status: None,
                }),
            },
            ApiOutcome::Failure { error, status } => Ok(ApiOutcome::Failure { error, status }),
        }
    }

    async fn read_ack(response: reqwest::Response) -> Result<ApiOutcome<()>, GatewayError> {
        match Self::read_envelope::<serde_json::Value>(response).await? {
            ApiOutcome::Success(_) => Ok(ApiOutcome::Success(())),
            ApiOutcome::Failure { error, status } => Ok(ApiOutcome::Failure { error, status }),
        }
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn get_cart(&self) -> Result<ApiOutcome<RemoteCart>, GatewayError> {
        let url = format!("{}/cart", self.base_url);
        let response = self.request(self.client.get(&url)).send().await?;
        Self::read_data(response).await
    }

    async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<ApiOutcome<()>, GatewayError> {
        let url = format!("{}/cart/items", self.base_url);
        let body = AddItemBody {
            product_id: product_id.as_i64(),
            quantity,
        };
        let response = self.request(self.client.post(&url).json(&body)).send().await?;
        Self::read_ack(response).await
    }

    async fn update_item(
        &self,
        item_id: &LineId,
        quantity: u32,
    ) -> Result<ApiOutcome<()>, GatewayError> {
        let url = format!("{}/cart/{}", self.base_url, item_id);
        let body = UpdateItemBody { quantity };
        let response = self.request(self.client.put(&url).json(&body)).send().await?;
        Self::read_ack(response).await
    }

    async fn remove_item(&self, item_id: &LineId) -> Result<ApiOutcome<()>, GatewayError> {
        let url = format!("{}/cart/{}", self.base_url, item_id);
        let response = self.request(self.client.delete(&url)).send().await?;
        Self::read_ack(response).await
    }

    async fn clear_cart(&self) -> Result<ApiOutcome<()>, GatewayError> {
        let url = format!("{}/cart", self.base_url);
        let response = self.request(self.client.delete(&url)).send().await?;
        Self::read_ack(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_cart(json: &str) -> RemoteCart {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_convert_keeps_well_formed_lines() {
        let cart = parse_cart(
            r#"{"items": [
                {"id": 11, "productId": 1, "name": "Bananas", "quantity": 2,
                 "unitPrice": "1.29", "discountPercent": 10, "maxQuantity": 10,
                 "image": "https://cdn.example.com/bananas.jpg"}
            ]}"#,
        );
        let items = convert_cart(cart);
        assert_eq!(items.len(), 1);
        let item = items.first().unwrap();
        assert_eq!(item.id, LineId::new("11"));
        assert_eq!(item.product_id, ProductId::new(1));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, Decimal::new(129, 2));
    }

    #[test]
    fn test_convert_accepts_string_line_ids() {
        let cart = parse_cart(
            r#"{"items": [
                {"id": "srv-42", "productId": 2, "name": "Butter",
                 "quantity": 1, "unitPrice": "4.99"}
            ]}"#,
        );
        let items = convert_cart(cart);
        assert_eq!(items.first().unwrap().id, LineId::new("srv-42"));
    }

    #[test]
    fn test_convert_drops_line_without_price() {
        let cart = parse_cart(
            r#"{"items": [
                {"id": 1, "productId": 1, "name": "Bananas", "quantity": 2},
                {"id": 2, "productId": 2, "name": "Butter", "quantity": 1,
                 "unitPrice": "4.99"}
            ]}"#,
        );
        let items = convert_cart(cart);
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().product_id, ProductId::new(2));
    }

    #[test]
    fn test_convert_drops_line_without_product_id() {
        let cart = parse_cart(r#"{"items": [{"id": 1, "unitPrice": "2.00"}]}"#);
        assert!(convert_cart(cart).is_empty());
    }

    #[test]
    fn test_convert_applies_defaults() {
        let cart = parse_cart(
            r#"{"items": [{"id": 1, "productId": 3, "unitPrice": "2.50"}]}"#,
        );
        let items = convert_cart(cart);
        let item = items.first().unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.discount_percent, 0);
        assert_eq!(item.max_quantity, DEFAULT_MAX_QUANTITY);
        assert_eq!(item.image, assets::PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_convert_clamps_quantity_to_limit() {
        let cart = parse_cart(
            r#"{"items": [{"id": 1, "productId": 3, "unitPrice": "2.50",
                "quantity": 30, "maxQuantity": 12}]}"#,
        );
        assert_eq!(convert_cart(cart).first().unwrap().quantity, 12);
    }

    #[test]
    fn test_envelope_missing_fields_default() {
        let envelope: Envelope<RemoteCart> = serde_json::from_str("{}").unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.error.is_none());
    }
}

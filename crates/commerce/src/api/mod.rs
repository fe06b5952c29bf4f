//! HTTP gateways to the remote cart and recommendation services.
//!
//! # Architecture
//!
//! - Thin request/response wrappers; no caching, no retry (the cart
//!   repository owns retry policy)
//! - HTTP-level failures (4xx/5xx, `success: false` envelopes) are returned
//!   as [`ApiOutcome::Failure`] *values*, never as `Err`
//! - Only transport and decode problems surface as [`GatewayError`], which
//!   every caller catches and folds into its own failure handling

pub mod cart;
pub mod recommendations;

pub use cart::{CartApi, HttpCartApi, RemoteCart, RemoteLine};
pub use recommendations::{HttpRecommendationApi, RecommendationApi, RemoteProduct};

use thiserror::Error;

/// Outcome of an API call that produced an HTTP response (or envelope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// 2xx response with `success: true`.
    Success(T),
    /// HTTP error status or `success: false` envelope.
    Failure {
        /// Error message from the service, or a synthesized one.
        error: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
    },
}

/// Failures below the HTTP contract: the request never completed, or the
/// body could not be decoded.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request did not produce an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// Response carried an unexpected status with no usable body.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        assert_eq!(
            GatewayError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(GatewayError::Status(503).to_string(), "unexpected status 503");
    }
}

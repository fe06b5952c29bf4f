//! Commerce layer configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GREENGROCER_CART_API_URL` - Base URL of the remote cart service
//! - `GREENGROCER_RECO_API_URL` - Base URL of the recommendation service
//!
//! ## Optional
//! - `GREENGROCER_CART_API_TOKEN` - Bearer token for the cart service
//! - `GREENGROCER_CART_TIMEOUT_SECS` - Cart request timeout (default: 20)
//! - `GREENGROCER_CART_FETCH_RETRIES` - Extra cart fetch attempts (default: 2)
//! - `GREENGROCER_CART_RETRY_DELAY_MS` - Delay between fetch attempts (default: 1000)
//! - `GREENGROCER_RECO_TIMEOUT_SECS` - Recommendation request timeout (default: 3)
//! - `GREENGROCER_RECO_TTL_SECS` - Recommendation cache TTL (default: 600)
//! - `GREENGROCER_PROFILE_DIR` - Local profile directory (default: .greengrocer)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_CART_TIMEOUT_SECS: u64 = 20;
const DEFAULT_FETCH_RETRIES: u32 = 2;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_RECO_TIMEOUT_SECS: u64 = 3;
const DEFAULT_RECO_TTL_SECS: u64 = 600;
const DEFAULT_PROFILE_DIR: &str = ".greengrocer";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce layer configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Remote cart service configuration.
    pub cart_api: CartApiConfig,
    /// Recommendation service configuration.
    pub recommendations: RecommendationConfig,
    /// Directory holding the persistent local profile (guest cart).
    pub profile_dir: PathBuf,
}

/// Remote cart service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CartApiConfig {
    /// Base URL of the cart service.
    pub base_url: Url,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Additional `GET /cart` attempts after a failed first try.
    pub fetch_retries: u32,
    /// Fixed delay between fetch attempts (constant backoff).
    pub retry_delay: Duration,
}

impl CartApiConfig {
    /// Config with defaults for everything but the base URL.
    #[must_use]
    pub const fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_CART_TIMEOUT_SECS),
            fetch_retries: DEFAULT_FETCH_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    /// The bearer token in the clear, for handing to an HTTP client.
    #[must_use]
    pub fn exposed_token(&self) -> Option<String> {
        self.api_token
            .as_ref()
            .map(|token| token.expose_secret().to_string())
    }
}

impl std::fmt::Debug for CartApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("fetch_retries", &self.fetch_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

/// Recommendation service configuration.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Base URL of the recommendation service.
    pub base_url: Url,
    /// Per-request timeout; short so recommendations never block a page.
    pub timeout: Duration,
    /// How long a cached recommendation list stays fresh.
    pub ttl: Duration,
}

impl RecommendationConfig {
    /// Config with defaults for everything but the base URL.
    #[must_use]
    pub const fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_RECO_TIMEOUT_SECS),
            ttl: Duration::from_secs(DEFAULT_RECO_TTL_SECS),
        }
    }
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let cart_api = CartApiConfig {
            base_url: get_url("GREENGROCER_CART_API_URL")?,
            api_token: std::env::var("GREENGROCER_CART_API_TOKEN")
                .ok()
                .map(SecretString::from),
            timeout: Duration::from_secs(get_parsed_or(
                "GREENGROCER_CART_TIMEOUT_SECS",
                DEFAULT_CART_TIMEOUT_SECS,
            )?),
            fetch_retries: get_parsed_or(
                "GREENGROCER_CART_FETCH_RETRIES",
                DEFAULT_FETCH_RETRIES,
            )?,
            retry_delay: Duration::from_millis(get_parsed_or(
                "GREENGROCER_CART_RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )?),
        };

        let recommendations = RecommendationConfig {
            base_url: get_url("GREENGROCER_RECO_API_URL")?,
            timeout: Duration::from_secs(get_parsed_or(
                "GREENGROCER_RECO_TIMEOUT_SECS",
                DEFAULT_RECO_TIMEOUT_SECS,
            )?),
            ttl: Duration::from_secs(get_parsed_or(
                "GREENGROCER_RECO_TTL_SECS",
                DEFAULT_RECO_TTL_SECS,
            )?),
        };

        Ok(Self {
            cart_api,
            recommendations,
            profile_dir: PathBuf::from(get_env_or_default(
                "GREENGROCER_PROFILE_DIR",
                DEFAULT_PROFILE_DIR,
            )),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default fallback.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable parsed as a URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    parse_url(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

/// Get an optional environment variable parsed as a number.
fn get_parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse and sanity-check a base URL.
fn parse_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_accepts_http_and_https() {
        assert!(parse_url("https://api.greengrocer.dev/v1").is_ok());
        assert!(parse_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("ftp://example.com").is_err());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_for_base_url_defaults() {
        let config =
            CartApiConfig::for_base_url(Url::parse("https://api.greengrocer.dev").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.fetch_retries, 2);
        assert_eq!(config.retry_delay, Duration::from_millis(1000));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_recommendation_defaults() {
        let config =
            RecommendationConfig::for_base_url(Url::parse("https://api.greengrocer.dev").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_cart_config_debug_redacts_token() {
        let mut config =
            CartApiConfig::for_base_url(Url::parse("https://api.greengrocer.dev").unwrap());
        config.api_token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}

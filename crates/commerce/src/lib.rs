//! GreenGrocer commerce state synchronization layer.
//!
//! # Architecture
//!
//! The storefront never talks to a storage authority directly; it reads
//! derived state (cart lines, totals, recommendation lists) and calls a
//! small set of mutating operations on two entry points:
//!
//! - [`CartSyncEngine`] - keeps the cart consistent across the persistent
//!   local store (guest sessions) and the remote cart service
//!   (authenticated sessions), reconciling on session transitions
//! - [`Recommender`] - per-product and per-customer recommendations from a
//!   static association graph, the remote recommendation service, and
//!   random fill, under a 10-minute TTL cache
//!
//! # Example
//!
//! ```rust,ignore
//! use greengrocer_commerce::{
//!     CartSyncEngine, CommerceConfig, HttpCartApi, RetryPolicy, storage::FileStore,
//! };
//!
//! let config = CommerceConfig::from_env()?;
//! let engine = CartSyncEngine::new(
//!     FileStore::new(&config.profile_dir),
//!     HttpCartApi::new(&config.cart_api),
//!     RetryPolicy::from(&config.cart_api),
//! );
//!
//! engine.refresh().await?;
//! engine.add_item(&product, 2).await?;
//! let totals = engine.totals();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod assets;
pub mod cart;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod recommendations;
pub mod storage;

pub use api::{ApiOutcome, CartApi, GatewayError, HttpCartApi, HttpRecommendationApi,
    RecommendationApi};
pub use cart::{CartRepository, CartSyncEngine, LocalRepository, RemoteRepository, RetryPolicy};
pub use catalog::{ProductCatalog, StaticCatalog};
pub use clock::{Clock, SystemClock};
pub use config::{CartApiConfig, CommerceConfig, ConfigError, RecommendationConfig};
pub use error::CartError;
pub use recommendations::{DEFAULT_LIMIT, Recommender};

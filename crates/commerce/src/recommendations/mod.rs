//! Recommendation lookup with a TTL cache.
//!
//! # Sources, in priority order
//!
//! 1. The cache, when the entry is younger than the TTL
//! 2. The static association graph, resolved against the catalog
//! 3. The remote recommendation service (errors degrade, never propagate)
//! 4. Uniform random fill from the catalog
//!
//! The lookup stops as soon as `limit` products are collected and always
//! caches whatever it assembled. Recommendations are a non-critical
//! enhancement: nothing in here can fail the surrounding page.

pub mod associations;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use tracing::{debug, instrument, warn};

use greengrocer_core::{CustomerId, Product, ProductId};

use crate::api::RecommendationApi;
use crate::catalog::ProductCatalog;
use crate::clock::Clock;

/// How many products a lookup returns unless asked otherwise.
pub const DEFAULT_LIMIT: usize = 4;

/// A cached recommendation list.
///
/// Created on first lookup miss, replaced wholesale when it expires, never
/// partially mutated.
#[derive(Debug, Clone)]
struct RecommendationEntry {
    products: Vec<Product>,
    fetched_at: DateTime<Utc>,
}

/// Per-product and per-customer recommendation lookup.
///
/// One cache serves both keyspaces: product entries are keyed by the product
/// id, customer entries by the *negated* customer id, keeping the two
/// disjoint.
pub struct Recommender<A> {
    api: A,
    catalog: Arc<dyn ProductCatalog>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    cache: Mutex<HashMap<i64, RecommendationEntry>>,
}

impl<A: RecommendationApi> Recommender<A> {
    /// Create a recommender.
    ///
    /// `ttl` bounds how long a cached list is served; expiry is driven by
    /// the injected clock, so tests control it without timers.
    #[must_use]
    pub fn new(
        api: A,
        catalog: Arc<dyn ProductCatalog>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            api,
            catalog,
            clock,
            ttl: chrono::Duration::from_std(ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(10)),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Products to show next to a product page.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn for_product(&self, product_id: ProductId, limit: usize) -> Vec<Product> {
        let key = product_id.as_i64();
        if let Some(hit) = self.cached(key, limit) {
            debug!("recommendation cache hit");
            return hit;
        }

        let mut picks: Vec<Product> = Vec::with_capacity(limit);

        // Cheapest source first: the hand-curated association graph.
        for related in associations::related_ids(product_id) {
            if picks.len() >= limit {
                break;
            }
            if let Some(product) = self.catalog.product(ProductId::new(*related)) {
                push_unique(&mut picks, product.clone(), Some(product_id));
            }
        }

        if picks.len() < limit {
            match self.api.related_to_product(product_id, limit).await {
                Ok(remote) => {
                    for product in remote {
                        if picks.len() >= limit {
                            break;
                        }
                        push_unique(&mut picks, product, Some(product_id));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "recommendation service unavailable, falling back to catalog sample");
                }
            }
        }

        if picks.len() < limit {
            self.random_fill(&mut picks, limit, Some(product_id));
        }

        self.store(key, picks.clone());
        picks
    }

    /// Personalized picks for a customer (account page, home carousel).
    ///
    /// Same shape as [`Self::for_product`] minus the association graph -
    /// there are no customer-level static associations.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn for_customer(&self, customer_id: CustomerId, limit: usize) -> Vec<Product> {
        // Negated so customer entries can never collide with product entries.
        let key = -customer_id.as_i64();
        if let Some(hit) = self.cached(key, limit) {
            debug!("recommendation cache hit");
            return hit;
        }

        let mut picks: Vec<Product> = Vec::with_capacity(limit);

        match self.api.picks_for_customer(customer_id, limit).await {
            Ok(remote) => {
                for product in remote {
                    if picks.len() >= limit {
                        break;
                    }
                    push_unique(&mut picks, product, None);
                }
            }
            Err(e) => {
                warn!(error = %e, "recommendation service unavailable, falling back to catalog sample");
            }
        }

        if picks.len() < limit {
            self.random_fill(&mut picks, limit, None);
        }

        self.store(key, picks.clone());
        picks
    }

    /// Draw uniformly at random (without replacement) from the catalog,
    /// excluding the source product and everything already chosen.
    fn random_fill(&self, picks: &mut Vec<Product>, limit: usize, exclude: Option<ProductId>) {
        let pool: Vec<&Product> = self
            .catalog
            .products()
            .iter()
            .filter(|p| Some(p.id) != exclude && !picks.iter().any(|c| c.id == p.id))
            .collect();

        let need = limit.saturating_sub(picks.len());
        let mut rng = rand::rng();
        for product in pool.choose_multiple(&mut rng, need) {
            picks.push((*product).clone());
        }
    }

    fn cached(&self, key: i64, limit: usize) -> Option<Vec<Product>> {
        let cache = self.lock_cache();
        let entry = cache.get(&key)?;
        if self.clock.now() - entry.fetched_at < self.ttl {
            Some(entry.products.iter().take(limit).cloned().collect())
        } else {
            None
        }
    }

    fn store(&self, key: i64, products: Vec<Product>) {
        let entry = RecommendationEntry {
            products,
            fetched_at: self.clock.now(),
        };
        self.lock_cache().insert(key, entry);
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<i64, RecommendationEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn push_unique(picks: &mut Vec<Product>, product: Product, source: Option<ProductId>) {
    if Some(product.id) == source {
        return;
    }
    if picks.iter().any(|p| p.id == product.id) {
        return;
    }
    picks.push(product);
}

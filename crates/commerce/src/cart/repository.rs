//! The two cart authorities behind one repository seam.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use greengrocer_core::{LineId, LineItem, Product, ProductId};

use crate::api::{ApiOutcome, CartApi, GatewayError, cart::convert_cart};
use crate::assets;
use crate::config::CartApiConfig;
use crate::error::CartError;
use crate::storage::{KeyValueStore, LocalCartStore};

/// Statuses that mean "this endpoint does not exist here".
const UNSUPPORTED_STATUSES: [u16; 3] = [404, 405, 501];

/// A cart authority.
///
/// Every mutation returns the resulting full snapshot; the engine replaces
/// its in-memory state with whatever comes back and never keeps its own
/// optimistic guess.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load the current cart.
    async fn load(&self) -> Result<Vec<LineItem>, CartError>;

    /// Add `quantity` units of a product.
    async fn add_item(&self, product: &Product, quantity: u32)
    -> Result<Vec<LineItem>, CartError>;

    /// Set a line's quantity. Quantity 0 removes the line.
    async fn update_item(
        &self,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<Vec<LineItem>, CartError>;

    /// Remove a line. Removing an absent line is a no-op.
    async fn remove_item(&self, line_id: &LineId) -> Result<Vec<LineItem>, CartError>;

    /// Empty the cart.
    async fn clear(&self) -> Result<Vec<LineItem>, CartError>;
}

// =============================================================================
// LocalRepository (guest mode)
// =============================================================================

/// Guest-mode authority: the persistent local store.
///
/// Mutations apply optimistically and persist before returning; nothing here
/// can fail, because storage trouble degrades to an empty cart rather than
/// erroring.
#[derive(Debug)]
pub struct LocalRepository<K> {
    store: LocalCartStore<K>,
}

impl<K: KeyValueStore> LocalRepository<K> {
    /// Wrap a key-value backend.
    pub const fn new(store: K) -> Self {
        Self {
            store: LocalCartStore::new(store),
        }
    }

    /// Read the persisted guest cart without going through the engine.
    pub(crate) fn persisted(&self) -> Vec<LineItem> {
        self.store.load()
    }

    /// Replace the persisted guest cart.
    pub(crate) fn persist(&self, items: &[LineItem]) {
        if items.is_empty() {
            self.store.clear();
        } else {
            self.store.save(items);
        }
    }

    fn new_line(product: &Product, quantity: u32) -> LineItem {
        let max_quantity = product.max_quantity.max(1);
        LineItem {
            id: LineId::generate(),
            product_id: product.id,
            name: product.name.clone(),
            quantity: quantity.clamp(1, max_quantity),
            unit_price: product.price,
            discount_percent: product.discount_percent.min(100),
            max_quantity,
            // Persisted snapshots must render without a third-party image
            // host, so the image reference is rewritten to a bundled asset.
            image: assets::local_image_for(&product.name).to_string(),
        }
    }
}

#[async_trait]
impl<K: KeyValueStore> CartRepository for LocalRepository<K> {
    async fn load(&self) -> Result<Vec<LineItem>, CartError> {
        Ok(self.store.load())
    }

    async fn add_item(
        &self,
        product: &Product,
        quantity: u32,
    ) -> Result<Vec<LineItem>, CartError> {
        let mut items = self.store.load();

        match items.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => line.add_quantity(quantity),
            None => items.push(Self::new_line(product, quantity)),
        }

        self.store.save(&items);
        Ok(items)
    }

    async fn update_item(
        &self,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<Vec<LineItem>, CartError> {
        if quantity == 0 {
            return self.remove_item(line_id).await;
        }

        let mut items = self.store.load();
        match items.iter_mut().find(|line| line.id == *line_id) {
            Some(line) => line.set_quantity(quantity),
            None => {
                debug!(line = %line_id, "update for absent line, ignoring");
                return Ok(items);
            }
        }

        self.store.save(&items);
        Ok(items)
    }

    async fn remove_item(&self, line_id: &LineId) -> Result<Vec<LineItem>, CartError> {
        let mut items = self.store.load();
        let before = items.len();
        items.retain(|line| line.id != *line_id);

        if items.len() != before {
            self.store.save(&items);
        }
        Ok(items)
    }

    async fn clear(&self) -> Result<Vec<LineItem>, CartError> {
        self.store.clear();
        Ok(Vec::new())
    }
}

// =============================================================================
// RemoteRepository (authenticated mode)
// =============================================================================

/// Bounded retry for remote cart reads.
///
/// Constant backoff: a fixed delay between attempts keeps worst-case latency
/// predictable (`(max_retries) * delay` of waiting) instead of masking a
/// truly unavailable backend behind growing sleeps.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after a failed first try.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

impl From<&CartApiConfig> for RetryPolicy {
    fn from(config: &CartApiConfig) -> Self {
        Self {
            max_retries: config.fetch_retries,
            delay: config.retry_delay,
        }
    }
}

/// Authenticated-mode authority: the remote cart service.
///
/// Every mutation issues the remote call and then refetches the full cart -
/// the remote side may clamp quantities, apply promotions, or reject the
/// item, so the local guess is never trusted.
#[derive(Debug)]
pub struct RemoteRepository<C> {
    api: C,
    policy: RetryPolicy,
}

impl<C: CartApi> RemoteRepository<C> {
    /// Wrap a cart service client.
    pub const fn new(api: C, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// Fetch the cart, retrying transient failures under the policy.
    async fn fetch_cart(&self) -> Result<Vec<LineItem>, CartError> {
        let mut attempt: u32 = 0;
        loop {
            match self.api.get_cart().await {
                Ok(ApiOutcome::Success(cart)) => {
                    if attempt > 0 {
                        debug!(attempt, "cart fetch recovered after retry");
                    }
                    return Ok(convert_cart(cart));
                }
                Ok(ApiOutcome::Failure { error, status }) => {
                    warn!(status, error = %error, attempt, "cart fetch failed");
                }
                Err(e) => {
                    warn!(error = %e, attempt, "cart fetch did not reach the service");
                }
            }

            if attempt >= self.policy.max_retries {
                return Err(CartError::FetchFailed);
            }
            attempt += 1;
            tokio::time::sleep(self.policy.delay).await;
        }
    }

    /// Push one line to the remote cart without refetching.
    ///
    /// Used by the login-time merge, which batches its own refetch at the end.
    pub(crate) async fn push_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        match self.api.add_item(product_id, quantity).await {
            Ok(ApiOutcome::Success(())) => Ok(()),
            Ok(ApiOutcome::Failure { error, status }) => Err(rejected(error, status)),
            Err(e) => Err(transport_rejected(&e)),
        }
    }
}

fn rejected(error: String, status: Option<u16>) -> CartError {
    let detail = match status {
        Some(code) => format!("HTTP {code}: {error}"),
        None => error,
    };
    CartError::Rejected { detail }
}

fn transport_rejected(e: &GatewayError) -> CartError {
    CartError::Rejected {
        detail: e.to_string(),
    }
}

#[async_trait]
impl<C: CartApi> CartRepository for RemoteRepository<C> {
    async fn load(&self) -> Result<Vec<LineItem>, CartError> {
        self.fetch_cart().await
    }

    async fn add_item(
        &self,
        product: &Product,
        quantity: u32,
    ) -> Result<Vec<LineItem>, CartError> {
        match self.api.add_item(product.id, quantity).await {
            Ok(ApiOutcome::Success(())) => self.fetch_cart().await,
            Ok(ApiOutcome::Failure { error, status }) => {
                warn!(status, error = %error, product = %product.id, "remote add rejected");
                Err(rejected(error, status))
            }
            Err(e) => {
                warn!(error = %e, product = %product.id, "remote add did not reach the service");
                Err(transport_rejected(&e))
            }
        }
    }

    async fn update_item(
        &self,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<Vec<LineItem>, CartError> {
        if quantity == 0 {
            return self.remove_item(line_id).await;
        }

        match self.api.update_item(line_id, quantity).await {
            Ok(ApiOutcome::Success(())) => self.fetch_cart().await,
            Ok(ApiOutcome::Failure { error, status }) => {
                warn!(status, error = %error, line = %line_id, "remote update rejected");
                Err(rejected(error, status))
            }
            Err(e) => {
                warn!(error = %e, line = %line_id, "remote update did not reach the service");
                Err(transport_rejected(&e))
            }
        }
    }

    async fn remove_item(&self, line_id: &LineId) -> Result<Vec<LineItem>, CartError> {
        match self.api.remove_item(line_id).await {
            Ok(ApiOutcome::Success(())) => self.fetch_cart().await,
            // The line is already gone remotely; removal is idempotent.
            Ok(ApiOutcome::Failure {
                status: Some(404), ..
            }) => {
                debug!(line = %line_id, "remote line already absent");
                self.fetch_cart().await
            }
            Ok(ApiOutcome::Failure { error, status }) => {
                warn!(status, error = %error, line = %line_id, "remote remove rejected");
                Err(rejected(error, status))
            }
            Err(e) => {
                warn!(error = %e, line = %line_id, "remote remove did not reach the service");
                Err(transport_rejected(&e))
            }
        }
    }

    async fn clear(&self) -> Result<Vec<LineItem>, CartError> {
        match self.api.clear_cart().await {
            Ok(ApiOutcome::Success(())) => Ok(Vec::new()),
            Ok(ApiOutcome::Failure { status: Some(code), .. })
                if UNSUPPORTED_STATUSES.contains(&code) =>
            {
                // Older cart service deployments have no bulk clear; degrade
                // to clearing in-memory state only.
                info!(status = code, "remote clear unsupported, clearing in-memory state only");
                Ok(Vec::new())
            }
            Ok(ApiOutcome::Failure { error, status }) => {
                warn!(status, error = %error, "remote clear rejected");
                Err(rejected(error, status))
            }
            Err(e) => {
                warn!(error = %e, "remote clear did not reach the service");
                Err(transport_rejected(&e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: i64, max_quantity: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: "Bananas".to_string(),
            price: Decimal::new(129, 2),
            discount_percent: 0,
            max_quantity,
            image: "https://cdn.example.com/bananas.jpg".to_string(),
            category: Some("Fruit".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_new_line_rewrites_image_to_bundled_asset() {
        let repo = LocalRepository::new(MemoryStore::new());
        let items = repo.add_item(&product(1, 10), 2).await.unwrap();

        assert_eq!(items.len(), 1);
        let line = items.first().unwrap();
        assert_eq!(line.image, "/assets/products/bananas.jpg");
        assert_eq!(line.quantity, 2);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_with_clamp() {
        let repo = LocalRepository::new(MemoryStore::new());
        repo.add_item(&product(1, 10), 6).await.unwrap();
        let items = repo.add_item(&product(1, 10), 6).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let repo = LocalRepository::new(MemoryStore::new());
        let items = repo.add_item(&product(1, 10), 2).await.unwrap();
        let line_id = items.first().unwrap().id.clone();

        let items = repo.update_item(&line_id, 0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_update_clamps_to_purchase_limit() {
        let repo = LocalRepository::new(MemoryStore::new());
        let items = repo.add_item(&product(1, 5), 1).await.unwrap();
        let line_id = items.first().unwrap().id.clone();

        let items = repo.update_item(&line_id, 40).await.unwrap();
        assert_eq!(items.first().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let repo = LocalRepository::new(MemoryStore::new());
        let items = repo.add_item(&product(1, 10), 1).await.unwrap();
        let line_id = items.first().unwrap().id.clone();

        let items = repo.remove_item(&line_id).await.unwrap();
        assert!(items.is_empty());
        let items = repo.remove_item(&line_id).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_retry_policy_follows_config() {
        let mut config = CartApiConfig::for_base_url(
            url::Url::parse("https://api.greengrocer.dev").unwrap(),
        );
        config.fetch_retries = 5;
        config.retry_delay = Duration::from_millis(250);

        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_mutations_persist_across_repository_instances() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let repo = LocalRepository::new(std::sync::Arc::clone(&store));
        repo.add_item(&product(1, 10), 3).await.unwrap();

        let other = LocalRepository::new(store);
        let items = other.load().await.unwrap();
        assert_eq!(items.first().unwrap().quantity, 3);
    }
}

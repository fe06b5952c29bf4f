//! Guest cart persistence over a key-value store.

use greengrocer_core::LineItem;
use tracing::warn;

use super::KeyValueStore;

/// Storage key holding the serialized guest cart.
const CART_KEY: &str = "guest_cart";

/// The guest cart's persistent home.
///
/// Every operation is best-effort: a missing or corrupt payload reads as an
/// empty cart, and write failures (e.g. quota) are logged and swallowed so
/// cart operations never crash on storage trouble.
#[derive(Debug)]
pub struct LocalCartStore<K> {
    store: K,
}

impl<K: KeyValueStore> LocalCartStore<K> {
    /// Wrap a key-value backend.
    pub const fn new(store: K) -> Self {
        Self { store }
    }

    /// Load the persisted guest cart.
    ///
    /// Absent or corrupt data is treated as an empty cart, never an error.
    pub fn load(&self) -> Vec<LineItem> {
        let raw = match self.store.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read guest cart, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "corrupt guest cart payload, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist the guest cart. Best-effort; failures are logged only.
    pub fn save(&self, items: &[LineItem]) {
        let payload = match serde_json::to_string(items) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize guest cart");
                return;
            }
        };

        if let Err(e) = self.store.set(CART_KEY, &payload) {
            warn!(error = %e, "failed to persist guest cart");
        }
    }

    /// Remove the persisted guest cart. Best-effort; failures are logged only.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(CART_KEY) {
            warn!(error = %e, "failed to clear guest cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greengrocer_core::{LineId, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn item() -> LineItem {
        LineItem {
            id: LineId::new("line-1"),
            product_id: ProductId::new(3),
            name: "Butter".to_string(),
            quantity: 2,
            unit_price: Decimal::new(499, 2),
            discount_percent: 0,
            max_quantity: 6,
            image: "/assets/products/butter.jpg".to_string(),
        }
    }

    #[test]
    fn test_load_absent_cart_is_empty() {
        let store = LocalCartStore::new(MemoryStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let store = LocalCartStore::new(MemoryStore::new());
        store.save(&[item()]);

        let loaded = store.load();
        assert_eq!(loaded, vec![item()]);
    }

    #[test]
    fn test_corrupt_payload_reads_as_empty() {
        let backend = MemoryStore::new();
        backend.set(CART_KEY, "{not json").unwrap();

        let store = LocalCartStore::new(backend);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_removes_persisted_cart() {
        let store = LocalCartStore::new(MemoryStore::new());
        store.save(&[item()]);
        store.clear();
        assert!(store.load().is_empty());
    }
}

//! Product catalog collaborator.
//!
//! The catalog supplies the full product list used for association-graph
//! resolution and random recommendation fill. It is owned elsewhere; this
//! module only defines the seam plus an in-memory implementation.

use greengrocer_core::{Product, ProductId};

/// Read access to the full product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Every product in the catalog.
    fn products(&self) -> &[Product];

    /// Look up a single product by ID.
    fn product(&self, id: ProductId) -> Option<&Product>;
}

/// Catalog backed by a fixed product list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Build a catalog from a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl ProductCatalog for StaticCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

//! Catalog product type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as supplied by the catalog collaborator.
///
/// The catalog is the source of truth for pricing and purchase limits; cart
/// line items snapshot these fields at the time the product is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display name (e.g., "Bananas").
    pub name: String,
    /// Unit price before discount.
    pub price: Decimal,
    /// Discount percentage, 0-100.
    pub discount_percent: u8,
    /// Maximum quantity purchasable per order, at least 1.
    pub max_quantity: u32,
    /// Image reference for display.
    pub image: String,
    /// Optional category label (e.g., "Dairy").
    pub category: Option<String>,
}

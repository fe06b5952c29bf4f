//! Cart line items and derived totals.
//!
//! `CartTotals` is always recomputed from the line collection by
//! [`cart_totals`] - it is never stored alongside the items, so the two can
//! never drift apart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{LineId, ProductId};

/// A single line in a cart.
///
/// Invariant: `1 <= quantity <= max_quantity`. Mutations go through
/// [`LineItem::set_quantity`], which clamps rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Opaque line identifier (authority-assigned).
    pub id: LineId,
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Product display name, snapshotted at add time.
    pub name: String,
    /// Units of the product in the cart.
    pub quantity: u32,
    /// Unit price before discount.
    pub unit_price: Decimal,
    /// Discount percentage, 0-100.
    pub discount_percent: u8,
    /// Maximum purchasable quantity, at least 1.
    pub max_quantity: u32,
    /// Image reference, snapshotted at add time.
    pub image: String,
}

/// Validation failures for a line item arriving from an external authority.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// Product ID must be a positive integer.
    #[error("product id must be positive, got {0}")]
    InvalidProductId(i64),

    /// Unit price must be positive.
    #[error("unit price must be positive, got {0}")]
    InvalidUnitPrice(Decimal),

    /// Discount must be a percentage.
    #[error("discount percent must be 100 or less, got {0}")]
    DiscountOutOfRange(u8),

    /// A purchase limit of zero would make the line unrepresentable.
    #[error("max quantity must be at least 1")]
    ZeroMaxQuantity,

    /// Quantity must respect `1 <= quantity <= max_quantity`.
    #[error("quantity {quantity} outside 1..={max_quantity}")]
    QuantityOutOfRange {
        /// Offending quantity.
        quantity: u32,
        /// Purchase limit for the line.
        max_quantity: u32,
    },
}

impl LineItem {
    /// Set the quantity, clamped to `[1, max_quantity]`.
    ///
    /// Quantity 0 is not representable on a live line; callers treat a
    /// requested quantity of 0 as removal before getting here.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(1, self.max_quantity);
    }

    /// Increment the quantity, clamped to `max_quantity`.
    pub fn add_quantity(&mut self, additional: u32) {
        self.set_quantity(self.quantity.saturating_add(additional));
    }

    /// Price of this line after discount: `quantity * unit_price * (1 - discount/100)`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let discount = Decimal::from(self.discount_percent.min(100));
        Decimal::from(self.quantity) * self.unit_price
            * ((Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED)
    }

    /// Check the invariants an externally supplied line must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant. Callers ingesting remote data
    /// drop offending lines instead of propagating this error.
    pub fn validate(&self) -> Result<(), LineItemError> {
        if self.product_id.as_i64() <= 0 {
            return Err(LineItemError::InvalidProductId(self.product_id.as_i64()));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(LineItemError::InvalidUnitPrice(self.unit_price));
        }
        if self.discount_percent > 100 {
            return Err(LineItemError::DiscountOutOfRange(self.discount_percent));
        }
        if self.max_quantity == 0 {
            return Err(LineItemError::ZeroMaxQuantity);
        }
        if self.quantity == 0 || self.quantity > self.max_quantity {
            return Err(LineItemError::QuantityOutOfRange {
                quantity: self.quantity,
                max_quantity: self.max_quantity,
            });
        }
        Ok(())
    }
}

/// Aggregate totals derived from a cart's line items.
///
/// Always produced by [`cart_totals`]; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of all line quantities.
    pub total_items: u32,
    /// Sum of all discounted line totals.
    pub total_amount: Decimal,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub const ZERO: Self = Self {
        total_items: 0,
        total_amount: Decimal::ZERO,
    };
}

/// Recompute totals from a line collection.
#[must_use]
pub fn cart_totals(items: &[LineItem]) -> CartTotals {
    CartTotals {
        total_items: items.iter().map(|line| line.quantity).sum(),
        total_amount: items.iter().map(LineItem::line_total).sum(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(quantity: u32, unit_price: Decimal, discount_percent: u8) -> LineItem {
        LineItem {
            id: LineId::generate(),
            product_id: ProductId::new(1),
            name: "Bananas".to_string(),
            quantity,
            unit_price,
            discount_percent,
            max_quantity: 10,
            image: "/assets/products/bananas.jpg".to_string(),
        }
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        assert_eq!(cart_totals(&[]), CartTotals::ZERO);
    }

    #[test]
    fn test_totals_sum_quantities_and_amounts() {
        let items = vec![
            line(2, Decimal::new(250, 2), 0),  // 2 x 2.50
            line(3, Decimal::new(1000, 2), 0), // 3 x 10.00
        ];
        let totals = cart_totals(&items);
        assert_eq!(totals.total_items, 5);
        assert_eq!(totals.total_amount, Decimal::new(3500, 2));
    }

    #[test]
    fn test_totals_apply_discount() {
        // 4 x 5.00 at 25% off = 15.00
        let items = vec![line(4, Decimal::new(500, 2), 25)];
        assert_eq!(cart_totals(&items).total_amount, Decimal::new(1500, 2));
    }

    #[test]
    fn test_set_quantity_clamps_to_max() {
        let mut item = line(1, Decimal::ONE, 0);
        item.set_quantity(50);
        assert_eq!(item.quantity, 10);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut item = line(5, Decimal::ONE, 0);
        item.set_quantity(0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_add_quantity_saturates_at_max() {
        let mut item = line(6, Decimal::ONE, 0);
        item.add_quantity(6);
        assert_eq!(item.quantity, 10);
    }

    #[test]
    fn test_validate_rejects_missing_price() {
        let item = line(1, Decimal::ZERO, 0);
        assert_eq!(
            item.validate(),
            Err(LineItemError::InvalidUnitPrice(Decimal::ZERO))
        );
    }

    #[test]
    fn test_validate_rejects_nonpositive_product_id() {
        let mut item = line(1, Decimal::ONE, 0);
        item.product_id = ProductId::new(0);
        assert!(matches!(
            item.validate(),
            Err(LineItemError::InvalidProductId(0))
        ));
    }

    #[test]
    fn test_validate_accepts_well_formed_line() {
        assert_eq!(line(1, Decimal::ONE, 15).validate(), Ok(()));
    }

    #[test]
    fn test_line_item_json_roundtrip_keeps_price_as_string() {
        let item = line(2, Decimal::new(499, 2), 10);

        let payload = serde_json::to_string(&item).unwrap();
        // Prices travel and persist as decimal strings, never floats.
        assert!(payload.contains(r#""unit_price":"4.99""#));

        let restored: LineItem = serde_json::from_str(&payload).unwrap();
        assert_eq!(restored, item);
    }
}

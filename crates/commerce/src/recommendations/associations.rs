//! Hand-curated product association graph.
//!
//! The cheapest recommendation source: no I/O, no model, just merchandising
//! knowledge. Entries point at catalog product ids; roughly symmetric but
//! nothing requires it. Candidates are resolved against the live catalog
//! before use, so a stale id here degrades to nothing instead of erroring.

use greengrocer_core::ProductId;

/// product id -> related product ids, by catalog numbering.
const RELATED: &[(i64, &[i64])] = &[
    (1, &[2, 3, 22]),      // Apples
    (2, &[1, 3, 10]),      // Bananas
    (3, &[10, 24, 2]),     // Strawberries
    (4, &[14, 6, 13]),     // Avocado
    (5, &[6, 7, 21]),      // Baby Spinach
    (6, &[5, 7, 21]),      // Tomatoes
    (7, &[6, 5, 10]),      // Cucumber
    (8, &[5, 16, 19]),     // Carrots
    (9, &[23, 13, 14]),    // Whole Milk
    (10, &[3, 2, 24]),     // Greek Yogurt
    (11, &[14, 12, 20]),   // Cheddar Cheese
    (12, &[14, 15, 13]),   // Butter
    (13, &[12, 9, 14]),    // Free-Range Eggs
    (14, &[12, 11, 4]),    // Sourdough Bread
    (15, &[12, 23, 22]),   // Croissants
    (16, &[19, 8, 21]),    // Chicken Breast
    (17, &[20, 6, 11]),    // Ground Beef
    (18, &[19, 5, 21]),    // Salmon Fillet
    (19, &[16, 18, 8]),    // Basmati Rice
    (20, &[17, 6, 21]),    // Spaghetti
    (21, &[20, 6, 5]),     // Olive Oil
    (22, &[15, 1, 23]),    // Orange Juice
    (23, &[9, 15, 24]),    // Coffee Beans
    (24, &[3, 23, 10]),    // Dark Chocolate
];

/// Related product ids for a product; empty when unknown.
#[must_use]
pub fn related_ids(product_id: ProductId) -> &'static [i64] {
    RELATED
        .iter()
        .find(|(id, _)| *id == product_id.as_i64())
        .map_or(&[], |(_, related)| *related)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_product_has_candidates() {
        assert_eq!(related_ids(ProductId::new(2)), &[1, 3, 10]);
    }

    #[test]
    fn test_unknown_product_has_no_candidates() {
        assert!(related_ids(ProductId::new(9999)).is_empty());
    }

    #[test]
    fn test_no_product_recommends_itself() {
        for (id, related) in RELATED {
            assert!(!related.contains(id), "product {id} recommends itself");
        }
    }
}

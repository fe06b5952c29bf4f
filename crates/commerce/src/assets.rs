//! Local image asset lookup for cart snapshots.
//!
//! Guest carts are persisted across sessions, so the stored image reference
//! must not depend on a third-party image host being reachable later. When a
//! product enters the guest cart its image is rewritten through this static
//! product-name lookup; unknown products fall back to the placeholder.

/// Hand-maintained product-name to bundled-asset table.
///
/// Names match the catalog's display names; lookup is case-insensitive.
const PRODUCT_IMAGES: &[(&str, &str)] = &[
    ("Apples", "/assets/products/apples.jpg"),
    ("Bananas", "/assets/products/bananas.jpg"),
    ("Strawberries", "/assets/products/strawberries.jpg"),
    ("Avocado", "/assets/products/avocado.jpg"),
    ("Baby Spinach", "/assets/products/baby-spinach.jpg"),
    ("Tomatoes", "/assets/products/tomatoes.jpg"),
    ("Cucumber", "/assets/products/cucumber.jpg"),
    ("Carrots", "/assets/products/carrots.jpg"),
    ("Whole Milk", "/assets/products/whole-milk.jpg"),
    ("Greek Yogurt", "/assets/products/greek-yogurt.jpg"),
    ("Cheddar Cheese", "/assets/products/cheddar-cheese.jpg"),
    ("Butter", "/assets/products/butter.jpg"),
    ("Free-Range Eggs", "/assets/products/free-range-eggs.jpg"),
    ("Sourdough Bread", "/assets/products/sourdough-bread.jpg"),
    ("Croissants", "/assets/products/croissants.jpg"),
    ("Chicken Breast", "/assets/products/chicken-breast.jpg"),
    ("Ground Beef", "/assets/products/ground-beef.jpg"),
    ("Salmon Fillet", "/assets/products/salmon-fillet.jpg"),
    ("Basmati Rice", "/assets/products/basmati-rice.jpg"),
    ("Spaghetti", "/assets/products/spaghetti.jpg"),
    ("Olive Oil", "/assets/products/olive-oil.jpg"),
    ("Orange Juice", "/assets/products/orange-juice.jpg"),
    ("Coffee Beans", "/assets/products/coffee-beans.jpg"),
    ("Dark Chocolate", "/assets/products/dark-chocolate.jpg"),
];

/// Fallback asset for products without a bundled image.
pub const PLACEHOLDER_IMAGE: &str = "/assets/products/placeholder.jpg";

/// Resolve a product name to a bundled image asset.
///
/// Pure function; unknown names get [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn local_image_for(product_name: &str) -> &'static str {
    PRODUCT_IMAGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(product_name))
        .map_or(PLACEHOLDER_IMAGE, |(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_product_resolves_to_bundled_asset() {
        assert_eq!(local_image_for("Bananas"), "/assets/products/bananas.jpg");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(local_image_for("bananas"), "/assets/products/bananas.jpg");
    }

    #[test]
    fn test_unknown_product_falls_back_to_placeholder() {
        assert_eq!(local_image_for("Dragon Fruit"), PLACEHOLDER_IMAGE);
    }
}

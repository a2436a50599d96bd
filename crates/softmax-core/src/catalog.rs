//! Product search for the catalog and checkout screens.

use crate::types::Product;

/// Returns the products whose name or description contains `term`,
/// case-insensitively, in their original order. A blank term matches all.
pub fn filter_products(products: &[Product], term: &str) -> Vec<Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| matches_term(p, &needle))
        .cloned()
        .collect()
}

fn matches_term(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, description: Option<&str>) -> Product {
        Product {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price_cents: 100,
            stock: 1,
            category_id: None,
            supplier_id: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_name_and_description() {
        let products = vec![
            product("Coca-Cola", Some("Refrigerante 350ml")),
            product("Pão", None),
            product("Fanta", Some("refrigerante laranja")),
        ];

        let hits = filter_products(&products, "REFRI");
        let names: Vec<_> = hits.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Coca-Cola", "Fanta"]);

        assert_eq!(filter_products(&products, "pão").len(), 1);
        assert_eq!(filter_products(&products, "  ").len(), 3);
        assert!(filter_products(&products, "arroz").is_empty());
    }
}

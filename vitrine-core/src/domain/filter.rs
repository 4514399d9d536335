//! Storefront search projection

use super::product::Product;

/// Products whose name contains `term`, ignoring case
///
/// A blank term selects everything. Otherwise the term is matched as typed,
/// surrounding spaces included. Order follows the input snapshot.
pub fn filter_by_name(products: &[Product], term: &str) -> Vec<Product> {
    if term.trim().is_empty() {
        return products.to_vec();
    }
    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Produit A", Decimal::ONE),
            Product::new(2, "Fromage", Decimal::ONE),
            Product::new(3, "PRODUIT B", Decimal::ONE),
            Product::new(4, "Crème brûlée", Decimal::ONE),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(ids(&filter_by_name(&catalog(), "prod")), vec![1, 3]);
        assert_eq!(ids(&filter_by_name(&catalog(), "MAG")), vec![2]);
        assert_eq!(ids(&filter_by_name(&catalog(), "BRÛLÉE")), vec![4]);
    }

    #[test]
    fn test_spaces_in_term_are_significant() {
        let products = vec![
            Product::new(1, "Lait", Decimal::ONE),
            Product::new(2, "Pain de mie", Decimal::ONE),
        ];
        assert!(filter_by_name(&products, "t ").is_empty());
        assert_eq!(ids(&filter_by_name(&products, "n ")), vec![2]);
        assert_eq!(ids(&filter_by_name(&products, " de")), vec![2]);
        assert!(filter_by_name(&products, " lait").is_empty());
    }

    #[test]
    fn test_blank_term_returns_everything() {
        assert_eq!(ids(&filter_by_name(&catalog(), "")), vec![1, 2, 3, 4]);
        assert_eq!(ids(&filter_by_name(&catalog(), "   ")), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_by_name(&catalog(), "pizza").is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        for term in ["prod", "e", "", "xyz", "A"] {
            let once = filter_by_name(&catalog(), term);
            let twice = filter_by_name(&once, term);
            assert_eq!(once, twice, "term {:?}", term);
        }
    }
}

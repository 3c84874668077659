//! Purchasable generation packs.
//!
//! The catalog is read once from configuration (`PRODUCTS`, a JSON object of
//! `product_id -> {price, generations}`) and consulted when the payment side
//! issues generation tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One purchasable pack. `price` is in minor currency units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTerms {
    pub price: i64,
    pub generations: i32,
}

/// A product with its identifier, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    pub price: i64,
    pub generations: i32,
}

/// Product id -> terms, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductTerms>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        let products = BTreeMap::from([
            (
                "downgrade_pack_3".to_string(),
                ProductTerms {
                    price: 799,
                    generations: 3,
                },
            ),
            (
                "downgrade_pack_10".to_string(),
                ProductTerms {
                    price: 1999,
                    generations: 10,
                },
            ),
        ]);
        Self { products }
    }
}

impl ProductCatalog {
    /// Parse a catalog from its JSON configuration form.
    ///
    /// Every pack must grant at least one generation and have a non-negative
    /// price.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let products: BTreeMap<String, ProductTerms> = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid product table: {e}")))?;

        if let Some((id, _)) = products
            .iter()
            .find(|(_, terms)| terms.generations < 1 || terms.price < 0)
        {
            return Err(CoreError::Validation(format!(
                "Product '{id}' must grant at least one generation at a non-negative price"
            )));
        }

        Ok(Self { products })
    }

    pub fn get(&self, product_id: &str) -> Option<ProductTerms> {
        self.products.get(product_id).copied()
    }

    /// Generations granted by `product_id`.
    pub fn generations_for(&self, product_id: &str) -> Result<i32, CoreError> {
        self.get(product_id)
            .map(|terms| terms.generations)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Product",
                id: product_id.to_string(),
            })
    }

    pub fn list(&self) -> Vec<Product> {
        self.products
            .iter()
            .map(|(id, terms)| Product {
                id: id.clone(),
                price: terms.price,
                generations: terms.generations,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_catalog_has_two_packs() {
        let catalog = ProductCatalog::default();
        assert_eq!(catalog.generations_for("downgrade_pack_3").unwrap(), 3);
        assert_eq!(catalog.get("downgrade_pack_10").unwrap().price, 1999);
    }

    #[test]
    fn list_is_sorted_by_id() {
        let ids: Vec<String> = ProductCatalog::default().list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["downgrade_pack_10", "downgrade_pack_3"]);
    }

    #[test]
    fn parses_json_table() {
        let catalog =
            ProductCatalog::from_json(r#"{"single": {"price": 199, "generations": 1}}"#).unwrap();
        assert_eq!(catalog.list().len(), 1);
        assert_eq!(catalog.generations_for("single").unwrap(), 1);
    }

    #[test]
    fn rejects_malformed_json() {
        assert_matches!(ProductCatalog::from_json("[1, 2]"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_pack_without_generations() {
        let raw = r#"{"empty": {"price": 100, "generations": 0}}"#;
        let err = ProductCatalog::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn unknown_product_not_found() {
        assert_matches!(
            ProductCatalog::default().generations_for("nope"),
            Err(CoreError::NotFound { entity: "Product", .. })
        );
    }
}

//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::deserialize_some;

/// A product sold by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Stock keeping unit, e.g. "KND-GT-0A1B2C3D"
    pub sku: String,
    pub description: Option<String>,
    pub sale_price: Decimal,
    pub current_purchase_price: Decimal,
    pub min_stock: i32,
    pub is_active: bool,
    pub main_category_id: Option<Uuid>,
    pub secondary_category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub sale_price: Option<Decimal>,
    pub current_purchase_price: Option<Decimal>,
    pub min_stock: i32,
    pub main_category_id: Option<Uuid>,
    pub secondary_category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Input for updating a product. Category ids distinguish "leave as is"
/// (absent) from "clear" (`null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sale_price: Option<Decimal>,
    pub current_purchase_price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub main_category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub secondary_category_id: Option<Option<Uuid>>,
}

// ============================================================================
// SKU codes
// ============================================================================

/// Initials segment of a SKU: the first letter of every word, uppercased,
/// after dropping apostrophes, commas and periods.
pub fn sku_initials(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | ',' | '.'))
        .collect::<String>()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Build a SKU as `<prefix>-<initials>-<code>`
pub fn build_sku(prefix: &str, name: &str, code: &str) -> String {
    format!("{}-{}-{}", prefix, sku_initials(name), code.to_uppercase())
}

/// Short unique code for a new SKU: the first block of a v4 UUID
pub fn new_sku_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

/// Recompute the initials segment of an existing SKU after a rename.
/// Returns `None` when nothing changes or the SKU is not in the
/// three-segment form.
pub fn rename_sku(sku: &str, new_name: &str) -> Option<String> {
    let segments: Vec<&str> = sku.splitn(3, '-').collect();
    if segments.len() != 3 {
        return None;
    }
    let initials = sku_initials(new_name);
    if segments[1] == initials {
        return None;
    }
    Some(format!("{}-{}-{}", segments[0], initials, segments[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_initials() {
        assert_eq!(sku_initials("green tea"), "GT");
        assert_eq!(sku_initials("Mrs. Smith's Apple Pie, Large"), "MSAPL");
        assert_eq!(sku_initials("  single  "), "S");
    }

    #[test]
    fn test_build_sku() {
        assert_eq!(build_sku("KND", "Green Tea", "0a1b2c3d"), "KND-GT-0A1B2C3D");
    }

    #[test]
    fn test_new_sku_code_shape() {
        let code = new_sku_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_rename_sku() {
        assert_eq!(
            rename_sku("KND-GT-0A1B2C3D", "Black Tea"),
            Some("KND-BT-0A1B2C3D".to_string())
        );
        assert_eq!(rename_sku("KND-GT-0A1B2C3D", "Golden Tips"), None);
        assert_eq!(rename_sku("LEGACY", "Black Tea"), None);
    }

    #[test]
    fn test_update_input_distinguishes_null_from_absent() {
        let absent: UpdateProductInput = serde_json::from_str("{}").unwrap();
        assert!(absent.main_category_id.is_none());

        let cleared: UpdateProductInput =
            serde_json::from_str(r#"{"mainCategoryId": null}"#).unwrap();
        assert_eq!(cleared.main_category_id, Some(None));
    }
}

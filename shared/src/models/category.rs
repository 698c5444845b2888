//! Category models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category. Products reference at most one main and one
/// secondary category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role a category plays on a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRole {
    Main,
    Secondary,
}

impl CategoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryRole::Main => "main",
            CategoryRole::Secondary => "secondary",
        }
    }

    /// Whether a category with the given `is_main` flag can fill this role
    pub fn accepts(&self, is_main: bool) -> bool {
        match self {
            CategoryRole::Main => is_main,
            CategoryRole::Secondary => !is_main,
        }
    }
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub is_main: bool,
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_main: Option<bool>,
}

/// Category listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
    pub is_main: Option<bool>,
}

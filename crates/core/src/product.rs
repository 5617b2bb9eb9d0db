//! Catalog product records and the suggestion projection returned to callers

use serde::{Deserialize, Serialize};

/// A product as stored in the static catalog file
///
/// Records are loaded once and never mutated; identity is the position in
/// the loaded sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Currency-formatted price, e.g. "$24.99"
    pub price: String,
    pub description: String,
    pub product_url: String,
    pub graphic_url: String,
}

impl ProductRecord {
    /// First category, or empty when the record has none
    pub fn primary_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }
}

/// Product suggestion sent back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSuggestion {
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
    pub product_url: String,
    pub graphic_url: String,
}

impl From<&ProductRecord> for ProductSuggestion {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            category: record.primary_category().to_string(),
            price: record.price.clone(),
            description: record.description.clone(),
            product_url: record.product_url.clone(),
            graphic_url: record.graphic_url.clone(),
        }
    }
}

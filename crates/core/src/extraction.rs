//! Per-request extraction output

use serde::{Deserialize, Serialize};

use crate::product::ProductSuggestion;

/// A place mentioned by the model (park, vet, groomer, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub address: String,
}

impl LocationSuggestion {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Result of one pass through the extraction pipeline
///
/// Built fresh for every request and dropped once the response is sent.
/// `suggestions` never exceeds the matcher's configured limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub suggestions: Vec<ProductSuggestion>,
    pub locations: Vec<LocationSuggestion>,
    pub reply_text: String,
}

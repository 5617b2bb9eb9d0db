//! Catalog store
//!
//! Loads the static product file once at startup. The catalog is read-only
//! afterwards and is shared between requests behind an `Arc`.
//!
//! Loading never fails the caller: a missing or corrupt file yields an empty
//! catalog, so requests still succeed with empty suggestion lists.

use serde::{Deserialize, Serialize};
use std::path::Path;

use dog_assistant_core::ProductRecord;

use crate::CatalogError;

/// On-disk catalog format: `{"products": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductRecord>,
}

/// Records are decoded one by one so a single bad entry does not take the
/// whole catalog down.
#[derive(Debug, Deserialize)]
struct RawCatalogFile {
    products: Vec<serde_json::Value>,
}

/// In-memory product catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    /// Empty catalog
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from records already in memory
    pub fn from_records(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Load the catalog, degrading to an empty one on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.display(),
                    products = catalog.len(),
                    sample = catalog.products.first().map(|p| p.name.as_str()).unwrap_or("none"),
                    "Loaded product catalog"
                );
                catalog
            },
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load product catalog, continuing with an empty catalog"
                );
                Self::empty()
            },
        }
    }

    /// Load the catalog, surfacing read and parse errors
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a catalog document
    ///
    /// Fails only when the top level is malformed. Individual records that
    /// do not match the product shape are skipped with a warning.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalogFile = serde_json::from_str(content)
            .map_err(|e| CatalogError::Parse(format!("JSON parse error: {}", e)))?;

        let mut products = Vec::with_capacity(raw.products.len());
        for (index, value) in raw.products.into_iter().enumerate() {
            match serde_json::from_value::<ProductRecord>(value) {
                Ok(product) => products.push(product),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed catalog record");
                },
            }
        }

        Ok(Self { products })
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ProductRecord;
    type IntoIter = std::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

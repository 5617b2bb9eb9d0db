//! Product catalog for the dog assistant
//!
//! Features:
//! - One-shot loading of the static JSON catalog, degrading to empty on failure
//! - Case-insensitive keyword substring matching in catalog order

pub mod matcher;
pub mod store;

pub use matcher::{KeywordMatcher, MatchConfig};
pub use store::{Catalog, CatalogFile};

use thiserror::Error;

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Parse(String),
}

impl From<CatalogError> for dog_assistant_core::Error {
    fn from(err: CatalogError) -> Self {
        dog_assistant_core::Error::Catalog(err.to_string())
    }
}

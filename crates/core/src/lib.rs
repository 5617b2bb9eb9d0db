//! Core types for the dog assistant
//!
//! This crate provides the data model shared by every other crate:
//! - Catalog product records and their API projection
//! - Location suggestions extracted from model output
//! - The per-request extraction result
//! - The umbrella error type

pub mod error;
pub mod extraction;
pub mod product;

pub use error::{Error, Result};
pub use extraction::{ExtractionResult, LocationSuggestion};
pub use product::{ProductRecord, ProductSuggestion};

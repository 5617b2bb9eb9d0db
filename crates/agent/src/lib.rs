//! Extraction pipeline
//!
//! Features:
//! - One model call per chat message with a fixed extraction prompt
//! - Best-effort recovery of truncated JSON model output
//! - Keyword matching against the product catalog, biased toward dog products
//! - Location suggestions validated entity by entity

pub mod parser;
pub mod pipeline;

pub use parser::{
    first_balanced_object, parse_model_output, ModelOutput, ParsedOutput, Recovery,
    FALLBACK_RESPONSE,
};
pub use pipeline::{ExtractionPipeline, ANCHOR_KEYWORDS, SYSTEM_PROMPT};

use dog_assistant_llm::LlmError;
use thiserror::Error;

/// Pipeline errors
///
/// Malformed model output never shows up here; it is absorbed by the parser.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),
}

impl From<AgentError> for dog_assistant_core::Error {
    fn from(err: AgentError) -> Self {
        dog_assistant_core::Error::Extraction(err.to_string())
    }
}

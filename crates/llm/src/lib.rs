//! LLM integration for the dog assistant
//!
//! Features:
//! - `LlmBackend` trait so the pipeline can be driven by any chat model
//! - OpenAI-compatible chat-completions backend with JSON-object mode
//! - Scripted mock backend for tests (`test-support` feature)

pub mod backend;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
#[cfg(any(test, feature = "test-support"))]
pub use mock::MockBackend;
pub use prompt::{Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for dog_assistant_core::Error {
    fn from(err: LlmError) -> Self {
        dog_assistant_core::Error::Llm(err.to_string())
    }
}

//! Extraction pipeline
//!
//! One chat message in, one [`ExtractionResult`] out:
//! model call, output recovery, anchor-term augmentation, catalog matching
//! and location validation.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use dog_assistant_catalog::{Catalog, KeywordMatcher};
use dog_assistant_core::{ExtractionResult, LocationSuggestion, ProductSuggestion};
use dog_assistant_llm::{FinishReason, LlmBackend, Message};

use crate::parser::{parse_model_output, Recovery};
use crate::AgentError;

/// Instruction sent as the system turn of every request
pub const SYSTEM_PROMPT: &str = "You are an AI Dogy assistant that extracts product suggestions and \
locations from user messages about dogs. Respond with a JSON object containing 'keywords' (list of \
product keywords, including synonyms and related terms), 'locations' (list of places with 'name' and \
'address'), and 'response' (a friendly chat response to the user).";

/// Terms always added to the model's keywords so dog products surface
pub const ANCHOR_KEYWORDS: [&str; 3] = ["dog", "canine", "pet"];

/// Message-to-suggestions pipeline
///
/// Holds no per-request state; one instance serves all requests.
pub struct ExtractionPipeline {
    llm: Arc<dyn LlmBackend>,
    catalog: Arc<Catalog>,
    matcher: KeywordMatcher,
}

impl ExtractionPipeline {
    pub fn new(llm: Arc<dyn LlmBackend>, catalog: Arc<Catalog>, matcher: KeywordMatcher) -> Self {
        Self {
            llm,
            catalog,
            matcher,
        }
    }

    /// Run the full pipeline for one message
    ///
    /// Only a failed model call is an error. Unparseable output still
    /// produces a result with the fallback reply.
    pub async fn extract(&self, message: &str) -> Result<ExtractionResult, AgentError> {
        let messages = build_messages(message);

        let started = Instant::now();
        let generation = match self.llm.generate(&messages).await {
            Ok(generation) => generation,
            Err(e) => {
                tracing::error!(
                    model = self.llm.model_name(),
                    error = %e,
                    "Model call failed"
                );
                return Err(AgentError::Llm(e));
            },
        };
        metrics::histogram!("llm_latency_seconds").record(started.elapsed().as_secs_f64());

        if generation.finish_reason == FinishReason::Length {
            tracing::warn!(
                tokens = generation.tokens,
                "Model output hit the token limit and may be truncated"
            );
        }

        let parsed = parse_model_output(&generation.text);
        if parsed.recovery != Recovery::Strict {
            tracing::warn!(
                recovery = ?parsed.recovery,
                raw_len = generation.text.len(),
                "Model output was not a clean JSON object"
            );
        }

        let keywords = with_anchor_keywords(&parsed.output.keywords);
        let suggestions: Vec<ProductSuggestion> = self
            .matcher
            .find_matches(&keywords, &self.catalog)
            .into_iter()
            .map(ProductSuggestion::from)
            .collect();
        let locations = build_locations(&parsed.output.locations);

        tracing::info!(
            model_keywords = parsed.output.keywords.len(),
            suggestions = suggestions.len(),
            locations = locations.len(),
            latency_ms = generation.total_time_ms,
            "Extraction complete"
        );

        Ok(ExtractionResult {
            suggestions,
            locations,
            reply_text: parsed.output.response,
        })
    }

    /// Whether the model API answers
    pub async fn is_backend_available(&self) -> bool {
        self.llm.is_available().await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}

fn build_messages(user_message: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(user_message)]
}

/// Model keywords followed by the anchor terms, first spelling wins on
/// case-insensitive duplicates
fn with_anchor_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(String::as_str)
        .chain(ANCHOR_KEYWORDS)
        .filter(|k| seen.insert(k.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn build_locations(raw: &[Value]) -> Vec<LocationSuggestion> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let name = value.get("name").and_then(Value::as_str);
            let address = value.get("address").and_then(Value::as_str);
            match (name, address) {
                (Some(name), Some(address)) => Some(LocationSuggestion::new(name, address)),
                _ => {
                    tracing::warn!(index, location = %value, "Dropping incomplete location");
                    None
                },
            }
        })
        .collect()
}

//! Model output recovery
//!
//! The model is asked for a JSON object, but output cut at the token limit
//! or wrapped in prose is common. Recovery runs in three tiers:
//!
//! 1. Strict decode of the whole text.
//! 2. Decode of the first balanced `{...}` substring.
//! 3. A fixed fallback with no keywords, no locations and an apology.
//!
//! Tier 2 counts braces without looking at string literals, so a `}` inside
//! a quoted value can close the object early. That case falls through to
//! tier 3; it is a known limitation, not something to repair here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply used when nothing usable could be decoded
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't process that request.";

/// Structured model output with defaults filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Product keywords (and synonyms) mentioned by the user
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Raw location objects; validated later, one by one
    #[serde(default)]
    pub locations: Vec<Value>,
    /// Friendly chat reply
    #[serde(default = "fallback_response")]
    pub response: String,
}

fn fallback_response() -> String {
    FALLBACK_RESPONSE.to_string()
}

impl Default for ModelOutput {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            response: fallback_response(),
        }
    }
}

impl ModelOutput {
    /// Build from a decoded JSON value
    ///
    /// Returns `None` unless the value is an object. Fields of the wrong
    /// type are replaced by their defaults and non-string keywords are
    /// dropped.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        let keywords = match map.remove("keywords") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let locations = match map.remove("locations") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let response = match map.remove("response") {
            Some(Value::String(s)) => s,
            _ => fallback_response(),
        };

        Some(Self {
            keywords,
            locations,
            response,
        })
    }
}

/// Which tier produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The whole text was a JSON object
    Strict,
    /// A balanced object embedded in the text was decoded
    Embedded,
    /// Nothing decodable; defaults were used
    Fallback,
}

/// Parser result
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub output: ModelOutput,
    pub recovery: Recovery,
}

/// Parse raw model text. Never fails.
pub fn parse_model_output(raw: &str) -> ParsedOutput {
    let text = raw.trim().trim_matches('\u{feff}');

    if let Some(output) = decode_object(text) {
        return ParsedOutput {
            output,
            recovery: Recovery::Strict,
        };
    }

    if let Some(candidate) = first_balanced_object(text) {
        if let Some(output) = decode_object(candidate) {
            return ParsedOutput {
                output,
                recovery: Recovery::Embedded,
            };
        }
        tracing::debug!(candidate, "Balanced substring is not valid JSON");
    }

    ParsedOutput {
        output: ModelOutput::default(),
        recovery: Recovery::Fallback,
    }
}

fn decode_object(text: &str) -> Option<ModelOutput> {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(ModelOutput::from_value)
}

/// Leftmost brace-balanced `{...}` substring of `text`
///
/// Candidate starts are tried left to right; the first one whose brace
/// depth returns to zero wins. String literals are not tracked.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    for (start, _) in text.match_indices('{') {
        let mut depth = 0usize;
        for (offset, &byte) in bytes[start..].iter().enumerate() {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=start + offset]);
                    }
                },
                _ => {},
            }
        }
    }

    None
}

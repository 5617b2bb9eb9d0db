//! Scripted backend for tests
//!
//! Replays queued replies in order and records every conversation it was
//! asked to complete.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{FinishReason, GenerationResult, LlmBackend};
use crate::prompt::Message;
use crate::LlmError;

#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    unavailable: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that answers the first call with `text`
    pub fn with_reply(text: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.push_reply(text);
        backend
    }

    /// Backend whose first call fails with `error`
    pub fn with_error(error: LlmError) -> Self {
        let backend = Self::new();
        backend.push_error(error);
        backend
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies.lock().push_back(Ok(text.into()));
    }

    pub fn push_error(&self, error: LlmError) {
        self.replies.lock().push_back(Err(error));
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Conversations received so far
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.calls.lock().push(messages.to_vec());

        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api("no scripted reply left".to_string())))?;

        Ok(GenerationResult {
            tokens: reply.split_whitespace().count(),
            text: reply,
            total_time_ms: 0,
            finish_reason: FinishReason::Stop,
        })
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

//! Test-only mock provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::LlmProvider;

/// Scripted provider for tests: fixed embeddings per input text and a queue
/// of generation responses.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    embeddings: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    default_embedding: Vec<f32>,
    embed_calls: Arc<AtomicUsize>,
    fail_embed: bool,
    fail_generate: bool,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_embedding: vec![0.5, 0.5, 0.5],
            ..Self::default()
        }
    }

    /// Queue generation responses, returned in order; the last one repeats.
    #[must_use]
    pub fn with_responses(self, responses: Vec<String>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    /// Fix the embedding returned for one exact input text.
    #[must_use]
    pub fn with_embedding(self, text: &str, vector: Vec<f32>) -> Self {
        self.embeddings
            .lock()
            .unwrap()
            .insert(text.to_owned(), vector);
        self
    }

    #[must_use]
    pub fn with_default_embedding(mut self, vector: Vec<f32>) -> Self {
        self.default_embedding = vector;
        self
    }

    #[must_use]
    pub fn failing_embed(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    #[must_use]
    pub fn failing_generate(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    /// Number of `embed` calls made so far, successful or not.
    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for MockProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        if self.fail_generate {
            return Err(LlmError::Other("mock generate error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("mock response".into())
        } else if responses.len() == 1 {
            Ok(responses[0].clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_embed {
            return Err(LlmError::Other("mock embed error".into()));
        }
        let embeddings = self.embeddings.lock().unwrap();
        Ok(embeddings
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_embedding.clone()))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

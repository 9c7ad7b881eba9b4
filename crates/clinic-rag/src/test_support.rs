//! Stub providers for tests
//!
//! Hand-rolled substitutes behind the provider traits; no network, fully
//! deterministic.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider, VisionProvider};

/// Vision stub returning a fixed reply for every image
pub struct StubVision {
    reply: String,
}

impl StubVision {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[async_trait]
impl VisionProvider for StubVision {
    async fn analyze_image(&self, _prompt: &str, _image: &[u8], _filename: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "stub-vision"
    }
}

/// LLM stub replaying scripted replies in order; in echo mode it returns the
/// prompt itself so tests can observe what the pipeline sent.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    echo: bool,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            echo: false,
        }
    }

    pub fn echo() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            echo: true,
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.echo {
            return Ok(prompt.to_string());
        }
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Llm("scripted llm ran out of replies".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted-llm"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// LLM stub that always fails, for exercising the error path
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Llm("quota exceeded".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing-llm"
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Deterministic embedder hashing words into a fixed-length vector.
/// Shared words produce overlapping components, so related texts score
/// higher than unrelated ones under cosine similarity.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text.to_lowercase().split_whitespace() {
            let mut hash: u64 = 1469598103934665603;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash as usize) % self.dimensions] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// Embedder stub that always fails
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding("connection refused".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing-embedder"
    }
}

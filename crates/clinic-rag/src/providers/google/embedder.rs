//! Gemini embedding provider using text-embedding-004
//!
//! 768-dimension vectors; the same instance serves ingestion writes and
//! query reads so model/dimensionality stay aligned.

use async_trait::async_trait;

use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Embedding provider backed by the Generative Language API
pub struct GeminiEmbedder {
    http: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new embedder from configuration
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            dimensions: config.dimensions,
        }
    }

    /// Get the embedContent endpoint URL
    fn endpoint(&self) -> String {
        format!("{}/models/{}:embedContent", API_BASE, self.model)
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(serde::Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(serde::Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        let values = embed_response.embedding.values;
        if values.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "Unexpected embedding dimensionality: got {}, configured {}",
                values.len(),
                self.dimensions
            )));
        }

        Ok(values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.api_key.is_empty())
    }

    fn name(&self) -> &str {
        "gemini-embedding"
    }
}

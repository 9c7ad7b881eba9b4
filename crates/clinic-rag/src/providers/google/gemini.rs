//! Gemini client for text generation and image analysis
//!
//! Talks to the Generative Language API (`generateContent`) with API-key
//! auth. Images are sent as base64 inline data tagged with a MIME type
//! guessed from the filename.

use async_trait::async_trait;
use base64::Engine as _;

use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::providers::llm::LlmProvider;
use crate::providers::vision::VisionProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client via the Generative Language API
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.generation_model.clone(),
            temperature: config.temperature,
        }
    }

    /// Get the generateContent endpoint URL
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", API_BASE, self.model)
    }

    /// Send one user turn and return the concatenated reply text
    async fn generate_content(&self, parts: Vec<Part>) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Gemini generation failed ({}): {}",
                status, body
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Llm("No text in Gemini response".to_string()));
        }
        Ok(text)
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Base64-encode image bytes and tag them with a MIME type guessed from
    /// the filename (JPEG when the extension is unknown).
    fn image(image: &[u8], filename: &str) -> Self {
        let mime_type = mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or("image/jpeg")
            .to_string();

        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type,
                data: base64::engine::general_purpose::STANDARD.encode(image),
            }),
        }
    }
}

#[derive(serde::Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(vec![Part::text(prompt)]).await
    }

    async fn health_check(&self) -> Result<bool> {
        // A missing key fails every call; catch it before serving traffic
        Ok(!self.api_key.is_empty())
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl VisionProvider for GeminiClient {
    async fn analyze_image(&self, prompt: &str, image: &[u8], filename: &str) -> Result<String> {
        self.generate_content(vec![Part::text(prompt), Part::image(image, filename)])
            .await
            .map_err(|e| match e {
                Error::Llm(msg) => Error::Vision(msg),
                other => other,
            })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

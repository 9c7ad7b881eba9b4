//! Google Generative Language API providers
//!
//! One API key serves three roles: `GeminiClient` generates text and reads
//! images, `GeminiEmbedder` produces retrieval vectors.

pub mod embedder;
pub mod gemini;

pub use embedder::GeminiEmbedder;
pub use gemini::GeminiClient;

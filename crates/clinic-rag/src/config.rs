//! Configuration for the clinic backend

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Generative Language API configuration (LLM, vision, embeddings)
    #[serde(default)]
    pub google: GoogleConfig,
    /// Pinecone vector store configuration
    #[serde(default)]
    pub pinecone: PineconeConfig,
    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from `CLINIC_RAG_CONFIG` (or `./clinic-rag.toml` when
    /// present), then apply environment overrides for secrets.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CLINIC_RAG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("clinic-rag.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Environment variables take precedence over file values for secrets
    /// and service endpoints.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.google.api_key = key;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.pinecone.api_key = key;
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            self.pinecone.index_host = host;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 25MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 25 * 1024 * 1024, // 25MB
        }
    }
}

/// Google Generative Language API configuration
///
/// One model family serves three roles: `generation_model` answers chat
/// questions and summarizes transcriptions, the same model reads images
/// (vision), and `embedding_model` produces retrieval vectors. Writes and
/// queries MUST use the same embedding model and dimensionality; this struct
/// is the single place that discipline is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key (overridden by `GOOGLE_API_KEY`)
    #[serde(default)]
    pub api_key: String,
    /// Generation/vision model (default: "gemini-2.5-flash")
    pub generation_model: String,
    /// Embedding model (default: "text-embedding-004")
    pub embedding_model: String,
    /// Embedding dimensions (768 for text-embedding-004)
    pub dimensions: usize,
    /// Temperature for generation
    pub temperature: f32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            generation_model: "gemini-2.5-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            dimensions: 768,
            temperature: 0.3,
        }
    }
}

/// Pinecone vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// API key (overridden by `PINECONE_API_KEY`)
    #[serde(default)]
    pub api_key: String,
    /// Index data-plane host, e.g. "https://clinic-xxxx.svc.us-east-1.pinecone.io"
    /// (overridden by `PINECONE_INDEX_HOST`)
    #[serde(default)]
    pub index_host: String,
    /// Optional namespace within the index
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_host: String::new(),
            namespace: None,
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base data directory (records registry + uploaded files)
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the JSON records registry
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }

    /// Directory for uploaded raw files
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clinic-rag");
        Self { data_dir }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest records fetched per query (default: 5)
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.google.dimensions, 768);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.storage.records_path().ends_with("records.json"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            enable_cors = false
            max_upload_size = 1048576

            [pinecone]
            index_host = "https://idx.example.pinecone.io"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pinecone.index_host, "https://idx.example.pinecone.io");
        // Untouched sections fall back to defaults
        assert_eq!(config.google.embedding_model, "text-embedding-004");
    }
}

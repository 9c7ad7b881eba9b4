//! Application state for the clinic server
//!
//! All external clients are constructed once here and injected into the
//! pipelines as trait objects. Nothing below this layer touches a global.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::pipeline::{IngestPipeline, QueryPipeline};
use crate::providers::google::{GeminiClient, GeminiEmbedder};
use crate::providers::pinecone::PineconeVectorStore;
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider, VisionProvider};
use crate::storage::{JsonRecordStore, RecordStore, UploadStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    records: Arc<dyn RecordStore>,
    uploads: UploadStore,
    ingest: IngestPipeline,
    query: QueryPipeline,
}

impl AppState {
    /// Create state with the production providers (Gemini + Pinecone)
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let gemini = Arc::new(GeminiClient::new(&config.google));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(GeminiEmbedder::new(&config.google));
        let vector_store: Arc<dyn VectorStoreProvider> =
            Arc::new(PineconeVectorStore::new(&config.pinecone));
        let records: Arc<dyn RecordStore> =
            Arc::new(JsonRecordStore::open(config.storage.records_path())?);
        let uploads = UploadStore::new(config.storage.uploads_dir())?;

        tracing::info!(
            "Providers initialized (llm: {}, embedding: {} ({} dims))",
            config.google.generation_model,
            config.google.embedding_model,
            config.google.dimensions,
        );

        Self::assemble(
            config,
            records,
            uploads,
            gemini.clone(),
            gemini,
            embedder,
            vector_store,
        )
    }

    /// Create state from explicit providers; the seam tests use to
    /// substitute stubs for the hosted services.
    pub fn with_providers(
        config: AppConfig,
        records: Arc<dyn RecordStore>,
        uploads: UploadStore,
        vision: Arc<dyn VisionProvider>,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        Self::assemble(config, records, uploads, vision, llm, embedder, vector_store)
    }

    fn assemble(
        config: AppConfig,
        records: Arc<dyn RecordStore>,
        uploads: UploadStore,
        vision: Arc<dyn VisionProvider>,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        let ingest = IngestPipeline::new(
            vision,
            Arc::clone(&llm),
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
        );
        let query = QueryPipeline::new(embedder, llm, vector_store, config.retrieval.top_k);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                records,
                uploads,
                ingest,
                query,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the record store
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.inner.records
    }

    /// Get the upload store
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    /// Get the ingestion pipeline
    pub fn ingest(&self) -> &IngestPipeline {
        &self.inner.ingest
    }

    /// Get the query pipeline
    pub fn query(&self) -> &QueryPipeline {
        &self.inner.query
    }
}

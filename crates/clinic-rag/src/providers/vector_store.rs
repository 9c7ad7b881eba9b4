//! Vector store provider trait for storing and searching embedded records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Metadata carried by every vector record
///
/// `patient_id` is the retrieval scope; `file_id` links the record back to
/// the FileRecord that produced it. Records are write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub file_id: Uuid,
    pub patient_id: Uuid,
    /// Original filename of the uploaded artifact
    pub source: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One (embedding, text, metadata) tuple stored in the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record identifier; the ingestion pipeline uses the `file_id`
    pub id: Uuid,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: RecordMetadata,
}

/// Mandatory retrieval scope for nearest-neighbor search
///
/// There is deliberately no unscoped variant: a global search would cross
/// patient boundaries, which is a data leak in a medical corpus. Callers
/// must name the patient or file they are asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalScope {
    /// Restrict to records whose metadata `patient_id` matches
    Patient(Uuid),
    /// Restrict to records whose metadata `file_id` matches
    File(Uuid),
}

impl RetrievalScope {
    /// Metadata field name and expected value for the equality filter
    pub fn as_filter(&self) -> (&'static str, Uuid) {
        match self {
            Self::Patient(id) => ("patient_id", *id),
            Self::File(id) => ("file_id", *id),
        }
    }

    /// Check whether a record's metadata falls inside this scope
    pub fn matches(&self, metadata: &RecordMetadata) -> bool {
        match self {
            Self::Patient(id) => metadata.patient_id == *id,
            Self::File(id) => metadata.file_id == *id,
        }
    }
}

impl std::fmt::Display for RetrievalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patient(id) => write!(f, "patient:{}", id),
            Self::File(id) => write!(f, "file:{}", id),
        }
    }
}

/// Search result from the vector store
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub text: String,
    pub metadata: RecordMetadata,
    /// Similarity score, higher is more similar
    pub score: f32,
}

/// Trait for vector storage and scoped similarity search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert a record with its embedding (write-once, no update path)
    async fn upsert(&self, record: &VectorRecord) -> Result<()>;

    /// Fetch the `top_k` nearest records inside the given scope
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        scope: &RetrievalScope,
    ) -> Result<Vec<ScoredRecord>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

//! Pinecone vector store provider
//!
//! REST client for a Pinecone index data plane: `/vectors/upsert` for writes,
//! `/query` with a metadata equality filter for scoped nearest-neighbor
//! search. The record text rides along in metadata so retrieval needs no
//! second lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::config::PineconeConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::{
    RecordMetadata, RetrievalScope, ScoredRecord, VectorRecord, VectorStoreProvider,
};

/// Pinecone index client
pub struct PineconeVectorStore {
    http: reqwest::Client,
    api_key: String,
    /// Index data-plane host, e.g. "https://clinic-xxxx.svc.us-east-1.pinecone.io"
    index_host: String,
    namespace: Option<String>,
}

impl PineconeVectorStore {
    /// Create a new client from configuration
    pub fn new(config: &PineconeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            index_host: config.index_host.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.index_host, path)
    }

    /// Flatten a record's metadata (plus its text) into the string map
    /// Pinecone stores alongside the vector.
    fn to_metadata_map(record: &VectorRecord) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "file_id".to_string(),
            serde_json::Value::String(record.metadata.file_id.to_string()),
        );
        map.insert(
            "patient_id".to_string(),
            serde_json::Value::String(record.metadata.patient_id.to_string()),
        );
        map.insert(
            "source".to_string(),
            serde_json::Value::String(record.metadata.source.clone()),
        );
        map.insert(
            "uploaded_at".to_string(),
            serde_json::Value::String(record.metadata.uploaded_at.to_rfc3339()),
        );
        map.insert(
            "text".to_string(),
            serde_json::Value::String(record.text.clone()),
        );
        map
    }

    /// Rebuild a scored record from a query match; `None` when the stored
    /// metadata is missing fields this system always writes.
    fn from_match(m: QueryMatch) -> Option<ScoredRecord> {
        let metadata = m.metadata?;
        let get = |key: &str| metadata.get(key).and_then(|v| v.as_str());

        let record_metadata = RecordMetadata {
            file_id: get("file_id")?.parse().ok()?,
            patient_id: get("patient_id")?.parse().ok()?,
            source: get("source")?.to_string(),
            uploaded_at: get("uploaded_at")
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
        };

        Some(ScoredRecord {
            text: get("text").unwrap_or_default().to_string(),
            metadata: record_metadata,
            score: m.score,
        })
    }
}

#[derive(serde::Serialize)]
struct UpsertRequest {
    vectors: Vec<UpsertVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

#[derive(serde::Serialize)]
struct UpsertVector {
    id: String,
    values: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(serde::Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    filter: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

#[derive(serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(serde::Deserialize)]
struct QueryMatch {
    #[allow(dead_code)]
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<HashMap<String, serde_json::Value>>,
}

#[async_trait]
impl VectorStoreProvider for PineconeVectorStore {
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: record.id.to_string(),
                values: record.embedding.clone(),
                metadata: Self::to_metadata_map(record),
            }],
            namespace: self.namespace.clone(),
        };

        let response = self
            .http
            .post(self.url("/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Pinecone upsert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "Pinecone upsert failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        scope: &RetrievalScope,
    ) -> Result<Vec<ScoredRecord>> {
        let (field, value) = scope.as_filter();

        let request = QueryRequest {
            vector: query_embedding.to_vec(),
            top_k,
            include_metadata: true,
            filter: serde_json::json!({ field: { "$eq": value.to_string() } }),
            namespace: self.namespace.clone(),
        };

        let response = self
            .http
            .post(self.url("/query"))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Pinecone query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "Pinecone query failed ({}): {}",
                status, body
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorStore(format!("Failed to parse Pinecone response: {}", e)))?;

        let mut records = Vec::with_capacity(query_response.matches.len());
        for m in query_response.matches {
            match Self::from_match(m) {
                Some(record) => records.push(record),
                None => tracing::warn!("Dropping Pinecone match with incomplete metadata"),
            }
        }

        Ok(records)
    }

    async fn health_check(&self) -> Result<bool> {
        if self.api_key.is_empty() || self.index_host.is_empty() {
            return Ok(false);
        }

        let response = self
            .http
            .post(self.url("/describe_index_stats"))
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

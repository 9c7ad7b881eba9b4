//! In-process vector store
//!
//! Brute-force cosine scan over an in-memory record list, honoring the same
//! scope filters as the hosted store. Serves tests and offline development.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::providers::vector_store::{
    RetrievalScope, ScoredRecord, VectorRecord, VectorStoreProvider,
};

/// In-memory vector store
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<Vec<VectorRecord>>,
}

impl MemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero norm
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        scope: &RetrievalScope,
    ) -> Result<Vec<ScoredRecord>> {
        let records = self.records.read();

        let mut scored: Vec<ScoredRecord> = records
            .iter()
            .filter(|r| scope.matches(&r.metadata))
            .map(|r| ScoredRecord {
                text: r.text.clone(),
                metadata: r.metadata.clone(),
                score: cosine_similarity(query_embedding, &r.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(patient_id: Uuid, text: &str, embedding: Vec<f32>) -> VectorRecord {
        let file_id = Uuid::new_v4();
        VectorRecord {
            id: file_id,
            embedding,
            text: text.to_string(),
            metadata: crate::providers::vector_store::RecordMetadata {
                file_id,
                patient_id,
                source: format!("{}.jpg", text.split_whitespace().next().unwrap_or("doc")),
                uploaded_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn patient_scope_never_crosses_patients() {
        let store = MemoryVectorStore::new();
        let patient_a = Uuid::new_v4();
        let patient_b = Uuid::new_v4();

        // Mixed-patient corpus with near-identical embeddings
        store.upsert(&record(patient_a, "amoxicillin course", vec![1.0, 0.0, 0.0])).await.unwrap();
        store.upsert(&record(patient_a, "paracetamol dose", vec![0.9, 0.1, 0.0])).await.unwrap();
        store.upsert(&record(patient_b, "ibuprofen course", vec![1.0, 0.0, 0.0])).await.unwrap();
        store.upsert(&record(patient_b, "cetirizine dose", vec![0.95, 0.05, 0.0])).await.unwrap();

        let results = store
            .search(&[1.0, 0.0, 0.0], 10, &RetrievalScope::Patient(patient_a))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.metadata.patient_id == patient_a));
    }

    #[tokio::test]
    async fn file_scope_returns_single_record() {
        let store = MemoryVectorStore::new();
        let patient = Uuid::new_v4();

        let target = record(patient, "target document", vec![0.0, 1.0, 0.0]);
        store.upsert(&target).await.unwrap();
        store.upsert(&record(patient, "other document", vec![0.0, 1.0, 0.0])).await.unwrap();

        let results = store
            .search(&[0.0, 1.0, 0.0], 10, &RetrievalScope::File(target.metadata.file_id))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "target document");
    }

    #[tokio::test]
    async fn results_are_ranked_by_similarity() {
        let store = MemoryVectorStore::new();
        let patient = Uuid::new_v4();

        store.upsert(&record(patient, "far", vec![0.0, 1.0, 0.0])).await.unwrap();
        store.upsert(&record(patient, "near", vec![1.0, 0.0, 0.0])).await.unwrap();
        store.upsert(&record(patient, "middle", vec![0.7, 0.7, 0.0])).await.unwrap();

        let results = store
            .search(&[1.0, 0.0, 0.0], 2, &RetrievalScope::Patient(patient))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "near");
        assert_eq!(results[1].text, "middle");
    }
}

//! Document ingestion pipeline
//!
//! Orchestrates OCR, structured-summary generation and the vector-store
//! write for uploaded prescription and X-ray images. Providers are injected
//! so tests can substitute stubs.
//!
//! Write order is vector store first, then the caller appends the
//! FileRecord; a failure between the two leaves an orphan vector record.
//! There is no compensation: orphans are inert (retrievable only inside the
//! same patient scope) and a re-upload simply creates a fresh `file_id`.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::providers::vector_store::{RecordMetadata, VectorRecord};
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider, VisionProvider};
use crate::types::record::ArtifactKind;
use crate::types::report::{IngestReport, PipelineStatus};
use crate::types::summary::ArtifactSummary;

use super::cleanup::{parse_prescription_summary, parse_xray_findings};
use super::prompt;

/// Characters of extracted text echoed back in the upload report
const PREVIEW_CHARS: usize = 100;

/// Ingestion pipeline with injected providers
#[derive(Clone)]
pub struct IngestPipeline {
    vision: Arc<dyn VisionProvider>,
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
}

impl IngestPipeline {
    /// Create a pipeline from provider handles
    pub fn new(
        vision: Arc<dyn VisionProvider>,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            vision,
            llm,
            embedder,
            vector_store,
        }
    }

    /// Run the pipeline for one uploaded image.
    ///
    /// Never returns an error: every failure is converted into a report with
    /// `status == Error`. Callers check the status field.
    pub async fn ingest(
        &self,
        image: &[u8],
        filename: &str,
        kind: ArtifactKind,
        patient_id: Option<Uuid>,
    ) -> IngestReport {
        let result = match kind {
            ArtifactKind::Prescription => self.run_prescription(image, filename, patient_id).await,
            ArtifactKind::Xray => self.run_xray(image, filename, patient_id).await,
        };

        match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Ingestion of '{}' failed: {}", filename, e);
                IngestReport::error(e.to_string())
            }
        }
    }

    /// Prescription flow: transcribe, memorize, then summarize
    async fn run_prescription(
        &self,
        image: &[u8],
        filename: &str,
        patient_id: Option<Uuid>,
    ) -> Result<IngestReport> {
        tracing::info!("Reading prescription: {}", filename);

        let extracted_text = self
            .vision
            .analyze_image(prompt::TRANSCRIBE_PROMPT, image, filename)
            .await?;
        tracing::info!("Text extracted ({} chars)", extracted_text.len());

        let file_id = Uuid::new_v4();
        // An upload without a patient becomes its own retrieval scope
        let scope_id = patient_id.unwrap_or(file_id);

        self.memorize(file_id, scope_id, filename, &extracted_text).await?;

        let summary_reply = self.llm.generate(&prompt::summary_prompt(&extracted_text)).await?;
        let analysis = parse_prescription_summary(&summary_reply);

        let preview: String = extracted_text.chars().take(PREVIEW_CHARS).collect();

        Ok(IngestReport {
            status: PipelineStatus::Success,
            file_id: Some(file_id),
            patient_id: Some(scope_id),
            extracted_text_preview: Some(preview),
            analysis: Some(analysis),
            message: None,
        })
    }

    /// X-ray flow: extract findings, then memorize the one-sentence report
    /// so the scan becomes retrievable by the query pipeline.
    async fn run_xray(
        &self,
        image: &[u8],
        filename: &str,
        patient_id: Option<Uuid>,
    ) -> Result<IngestReport> {
        tracing::info!("Scanning X-ray: {}", filename);

        let reply = self
            .vision
            .analyze_image(prompt::XRAY_PROMPT, image, filename)
            .await?;
        let findings = parse_xray_findings(&reply);

        let file_id = Uuid::new_v4();
        let scope_id = patient_id.unwrap_or(file_id);

        self.memorize(file_id, scope_id, filename, &findings.report_sentence())
            .await?;

        Ok(IngestReport {
            status: PipelineStatus::Success,
            file_id: Some(file_id),
            patient_id: Some(scope_id),
            extracted_text_preview: None,
            analysis: Some(ArtifactSummary::Xray(findings)),
            message: None,
        })
    }

    /// Embed the text and write one vector record under the given scope
    async fn memorize(
        &self,
        file_id: Uuid,
        patient_id: Uuid,
        filename: &str,
        text: &str,
    ) -> Result<()> {
        let embedding = self.embedder.embed(text).await?;

        let record = VectorRecord {
            id: file_id,
            embedding,
            text: text.to_string(),
            metadata: RecordMetadata {
                file_id,
                patient_id,
                source: filename.to_string(),
                uploaded_at: Utc::now(),
            },
        };

        self.vector_store.upsert(&record).await?;
        tracing::info!(
            "Memorized '{}' as {} (patient {})",
            filename,
            file_id,
            patient_id
        );
        Ok(())
    }
}

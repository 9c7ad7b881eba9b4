//! Pipeline result and HTTP response types
//!
//! Pipelines never propagate upstream failures as faults; every result
//! carries a `status` field the caller must check. Missing resources are the
//! only errors surfaced at the transport layer (as 404s).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::summary::ArtifactSummary;

/// Outcome status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

/// Result of one ingestion pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub status: PipelineStatus,
    /// Identifier of the vector record written for this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
    /// Retrieval scope the artifact was stored under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    /// First 100 characters of the extracted text (prescriptions only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text_preview: Option<String>,
    /// Structured summary, always present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ArtifactSummary>,
    /// Error description when status is `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IngestReport {
    /// Build an error report; the pipeline converts every failure into this
    /// shape instead of propagating.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Error,
            file_id: None,
            patient_id: None,
            extracted_text_preview: None,
            analysis: None,
            message: Some(message.into()),
        }
    }
}

/// Result of one query pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub status: PipelineStatus,
    /// The assistant's answer (code fences stripped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Filename of the highest-ranked retrieved record, if any was retrieved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
    /// Error description when status is `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChatReply {
    /// Build an error reply
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Error,
            answer: None,
            source_document: None,
            message: Some(message.into()),
        }
    }
}

/// HTTP response for `POST /visits/{visit_id}/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub report: IngestReport,
    /// Chat-ready message describing the upload, also appended to the
    /// visit's history as a synthetic AI message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_message: Option<String>,
}

/// HTTP response for `POST /visits/{visit_id}/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: PipelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            status: reply.status,
            ai_response: reply.answer,
            source_document: reply.source_document,
            message: reply.message,
        }
    }
}

//! clinic-rag: medical-assistant backend with document ingestion and patient-scoped retrieval
//!
//! This crate glues a patient/visit web API to hosted AI services: a vision model
//! transcribes uploaded prescriptions and reads X-rays, the extracted text is embedded
//! and written to a hosted vector store, and chat questions are answered with
//! retrieval-augmented generation scoped to a single patient.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::{
    record::{ArtifactKind, Doctor, FileRecord, Message, Patient, Sender, Visit},
    report::{ChatResponse, IngestReport, PipelineStatus, UploadResponse},
    summary::{ArtifactSummary, PrescriptionSummary, UnparsedSummary, XrayFindings},
};

#[cfg(test)]
pub(crate) mod test_support;

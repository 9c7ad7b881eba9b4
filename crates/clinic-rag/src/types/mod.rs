//! Core domain types

pub mod record;
pub mod report;
pub mod summary;

pub use record::{ArtifactKind, Doctor, FileRecord, Message, Patient, Sender, Visit};
pub use report::{ChatReply, ChatResponse, IngestReport, PipelineStatus, UploadResponse};
pub use summary::{ArtifactSummary, PrescriptionSummary, UnparsedSummary, XrayFindings};

//! Patient, doctor and visit records with embedded file/message history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::summary::ArtifactSummary;

/// Kind of uploaded artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Handwritten or printed prescription, transcribed verbatim before analysis
    Prescription,
    /// Medical scan analyzed directly for findings
    Xray,
}

impl ArtifactKind {
    /// Parse the `file_type` tag sent by clients
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "prescription" => Some(Self::Prescription),
            "xray" | "x-ray" => Some(Self::Xray),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Prescription => "Prescription",
            Self::Xray => "X-Ray",
        }
    }
}

/// A registered patient
///
/// Created on registration, mutated only by the visit-count increment,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub created_at: DateTime<Utc>,
    /// Monotonically incrementing visit counter; visit N carries
    /// `visit_number == N`.
    pub total_visits: u32,
}

impl Patient {
    /// Create a new patient with zero visits
    pub fn new(name: String, age: u32, gender: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            age,
            gender,
            created_at: Utc::now(),
            total_visits: 0,
        }
    }
}

/// A doctor referenced by visits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
}

impl Doctor {
    /// Create a new doctor; specialty defaults to general practice
    pub fn new(name: String, specialty: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            specialty: specialty.unwrap_or_else(|| "General Physician".to_string()),
        }
    }
}

/// One uploaded artifact attached to a visit
///
/// Immutable once appended. `file_id` is the identifier of the matching
/// vector record; `stored_path` points at the raw bytes on local disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: Uuid,
    pub filename: String,
    pub kind: ArtifactKind,
    pub stored_path: PathBuf,
    pub summary: ArtifactSummary,
    pub uploaded_at: DateTime<Utc>,
}

/// Sender of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Doctor,
    Ai,
}

/// One chat turn in a visit's history, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message typed by the doctor
    pub fn doctor(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Doctor,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// A message produced by the assistant
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One patient visit, owning its ordered file and message history
///
/// Both lists are append-only; visits are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    /// 1 = first visit for this patient
    pub visit_number: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Visit {
    /// Create a visit with the given ordinal
    pub fn new(patient_id: Uuid, doctor_id: Option<Uuid>, visit_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            visit_number,
            timestamp: Utc::now(),
            files: Vec::new(),
            messages: Vec::new(),
        }
    }
}

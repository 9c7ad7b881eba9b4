//! Visit endpoints: creation, history, uploads and chat

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::vector_store::RetrievalScope;
use crate::server::state::AppState;
use crate::types::record::{ArtifactKind, FileRecord, Message, Visit};
use crate::types::report::{ChatResponse, PipelineStatus, UploadResponse};

/// Request body for `POST /visits/create`
#[derive(Debug, Deserialize)]
pub struct CreateVisitRequest {
    pub patient_id: Uuid,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
}

/// Request body for `POST /visits/{visit_id}/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    /// Narrow retrieval to one uploaded document instead of the whole patient
    #[serde(default)]
    pub file_id: Option<Uuid>,
}

/// POST /visits/create - Start a new visit
pub async fn create_visit(
    State(state): State<AppState>,
    Json(request): Json<CreateVisitRequest>,
) -> Result<Json<Visit>> {
    let visit = state
        .records()
        .create_visit(&request.patient_id, request.doctor_id)
        .await?;

    tracing::info!(
        "Visit {} started for patient {} (visit #{})",
        visit.id,
        visit.patient_id,
        visit.visit_number
    );
    Ok(Json(visit))
}

/// GET /visits/history/{patient_id} - Visits for a patient, newest first
pub async fn visit_history(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<Visit>>> {
    Ok(Json(state.records().visits_for_patient(&patient_id).await?))
}

/// POST /visits/{visit_id}/upload - Ingest a prescription or X-ray image
pub async fn upload_file(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut kind: Option<ArtifactKind> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("upload_{}.jpg", Uuid::new_v4()));
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            "file_type" => {
                let tag = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read file_type: {}", e)))?;
                kind = Some(
                    ArtifactKind::parse(&tag)
                        .ok_or_else(|| Error::InvalidRequest(format!("Unknown file_type: {}", tag)))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| Error::InvalidRequest("Missing 'file' field".to_string()))?;
    let kind = kind.ok_or_else(|| Error::InvalidRequest("Missing 'file_type' field".to_string()))?;

    let response = run_upload(&state, visit_id, &filename, kind, &data).await?;
    Ok(Json(response))
}

/// Upload orchestration after multipart parsing; tests call this directly.
pub(crate) async fn run_upload(
    state: &AppState,
    visit_id: Uuid,
    filename: &str,
    kind: ArtifactKind,
    data: &[u8],
) -> Result<UploadResponse> {
    // Unknown visits are a 404; pipeline failures are a payload, not a fault
    let visit = state.records().get_visit(&visit_id).await?;

    tracing::info!(
        "Upload for visit {}: {} ({}, {} bytes)",
        visit_id,
        filename,
        kind.display_name(),
        data.len()
    );

    let report = state
        .ingest()
        .ingest(data, filename, kind, Some(visit.patient_id))
        .await;

    if report.status != PipelineStatus::Success {
        return Ok(UploadResponse {
            report,
            chat_message: None,
        });
    }

    // Success reports always carry these fields
    let file_id = report
        .file_id
        .ok_or_else(|| Error::internal("ingest report missing file_id"))?;
    let summary = report
        .analysis
        .clone()
        .ok_or_else(|| Error::internal("ingest report missing analysis"))?;

    let stored_path = state.uploads().store(&file_id, filename, data).await?;

    let chat_message = summary.chat_line(filename);
    state
        .records()
        .append_file(
            &visit_id,
            FileRecord {
                file_id,
                filename: filename.to_string(),
                kind,
                stored_path,
                summary,
                uploaded_at: chrono::Utc::now(),
            },
        )
        .await?;
    state
        .records()
        .append_message(&visit_id, Message::ai(chat_message.clone()))
        .await?;

    Ok(UploadResponse {
        report,
        chat_message: Some(chat_message),
    })
}

/// POST /visits/{visit_id}/chat - Ask a question scoped to the visit's patient
pub async fn chat(
    State(state): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let response = run_chat(&state, visit_id, &request.query, request.file_id).await?;
    Ok(Json(response))
}

/// Chat orchestration; tests call this directly.
pub(crate) async fn run_chat(
    state: &AppState,
    visit_id: Uuid,
    query: &str,
    file_id: Option<Uuid>,
) -> Result<ChatResponse> {
    let visit = state.records().get_visit(&visit_id).await?;

    state
        .records()
        .append_message(&visit_id, Message::doctor(query))
        .await?;

    // Retrieval is always scoped: one document when asked for, otherwise the
    // visit's patient
    let scope = match file_id {
        Some(file_id) => RetrievalScope::File(file_id),
        None => RetrievalScope::Patient(visit.patient_id),
    };
    let reply = state.query().answer(query, scope).await;

    if let Some(answer) = &reply.answer {
        state
            .records()
            .append_message(&visit_id, Message::ai(answer.clone()))
            .await?;
    }

    Ok(reply.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::providers::memory::MemoryVectorStore;
    use crate::storage::{JsonRecordStore, RecordStore, UploadStore};
    use crate::test_support::{HashEmbedder, ScriptedLlm, StubVision};
    use crate::types::record::Sender;
    use crate::types::summary::ArtifactSummary;
    use std::sync::Arc;

    /// State wired with stub AI providers and a temp-dir record store
    fn test_state(vision_reply: &str, llm_replies: Vec<String>) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let records: Arc<dyn RecordStore> =
            Arc::new(JsonRecordStore::open(dir.path().join("records.json")).unwrap());
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();

        let state = AppState::with_providers(
            AppConfig::default(),
            records,
            uploads,
            Arc::new(StubVision::new(vision_reply)),
            Arc::new(ScriptedLlm::new(llm_replies)),
            Arc::new(HashEmbedder::new(16)),
            Arc::new(MemoryVectorStore::new()),
        )
        .unwrap();

        (state, dir)
    }

    async fn seed_visit(state: &AppState) -> Visit {
        let patient = state
            .records()
            .create_patient("Asha Rao".to_string(), 42, "female".to_string())
            .await
            .unwrap();
        state.records().create_visit(&patient.id, None).await.unwrap()
    }

    #[tokio::test]
    async fn upload_appends_file_record_and_synthetic_message() {
        let (state, _dir) = test_state(
            "Rx: Amoxicillin 500mg",
            vec![r#"{"patient_summary": "Antibiotic course.", "medicines": ["Amoxicillin"]}"#
                .to_string()],
        );
        let visit = seed_visit(&state).await;

        let response = run_upload(&state, visit.id, "rx.jpg", ArtifactKind::Prescription, b"img")
            .await
            .unwrap();

        assert_eq!(response.report.status, PipelineStatus::Success);
        assert!(response.chat_message.as_deref().unwrap().contains("rx.jpg"));

        let visit = state.records().get_visit(&visit.id).await.unwrap();
        assert_eq!(visit.files.len(), 1);
        assert!(matches!(visit.files[0].summary, ArtifactSummary::Prescription(_)));
        assert_eq!(visit.files[0].file_id, response.report.file_id.unwrap());
        assert!(visit.files[0].stored_path.exists());

        assert_eq!(visit.messages.len(), 1);
        assert_eq!(visit.messages[0].sender, Sender::Ai);
    }

    #[tokio::test]
    async fn failed_ingestion_appends_nothing() {
        // ScriptedLlm with no replies fails the summary call
        let (state, _dir) = test_state("Rx: something", vec![]);
        let visit = seed_visit(&state).await;

        let response = run_upload(&state, visit.id, "rx.jpg", ArtifactKind::Prescription, b"img")
            .await
            .unwrap();

        assert_eq!(response.report.status, PipelineStatus::Error);
        assert!(response.chat_message.is_none());

        let visit = state.records().get_visit(&visit.id).await.unwrap();
        assert!(visit.files.is_empty());
        assert!(visit.messages.is_empty());
    }

    #[tokio::test]
    async fn upload_to_unknown_visit_is_not_found() {
        let (state, _dir) = test_state("unused", vec![]);
        let err = run_upload(&state, Uuid::new_v4(), "rx.jpg", ArtifactKind::Prescription, b"img")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VisitNotFound(_)));
    }

    #[tokio::test]
    async fn two_chat_calls_append_two_messages_each_in_order() {
        let (state, _dir) = test_state(
            "unused",
            vec!["First answer.".to_string(), "Second answer.".to_string()],
        );
        let visit = seed_visit(&state).await;

        run_chat(&state, visit.id, "First question?", None).await.unwrap();
        run_chat(&state, visit.id, "Second question?", None).await.unwrap();

        let visit = state.records().get_visit(&visit.id).await.unwrap();
        assert_eq!(visit.messages.len(), 4);

        let turns: Vec<(Sender, &str)> = visit
            .messages
            .iter()
            .map(|m| (m.sender, m.text.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                (Sender::Doctor, "First question?"),
                (Sender::Ai, "First answer."),
                (Sender::Doctor, "Second question?"),
                (Sender::Ai, "Second answer."),
            ]
        );
    }

    #[tokio::test]
    async fn chat_is_scoped_to_the_visits_patient() {
        let (state, _dir) = test_state(
            "Rx: Metformin 500mg",
            vec![
                r#"{"patient_summary": "Diabetes medication."}"#.to_string(),
                r#"{"patient_summary": "Unrelated record."}"#.to_string(),
                "Metformin 500mg, taken twice daily.".to_string(),
            ],
        );

        // Two patients, one upload each
        let visit_a = seed_visit(&state).await;
        let visit_b = seed_visit(&state).await;
        run_upload(&state, visit_a.id, "metformin.jpg", ArtifactKind::Prescription, b"img")
            .await
            .unwrap();
        run_upload(&state, visit_b.id, "other.jpg", ArtifactKind::Prescription, b"img")
            .await
            .unwrap();

        let reply = state
            .query()
            .answer("Metformin dosage?", RetrievalScope::Patient(visit_a.patient_id))
            .await;

        // Source attribution must come from patient A's own upload, never
        // from the other patient's records
        assert_eq!(reply.status, PipelineStatus::Success);
        assert_eq!(reply.source_document.as_deref(), Some("metformin.jpg"));
    }
}

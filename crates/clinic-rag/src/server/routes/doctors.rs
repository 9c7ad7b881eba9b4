//! Doctor registration and listing endpoints

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::record::Doctor;

/// Request body for `POST /doctors/create`
#[derive(Debug, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// POST /doctors/create - Register a new doctor
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Doctor>> {
    let doctor = state
        .records()
        .create_doctor(request.name, request.specialty)
        .await?;
    Ok(Json(doctor))
}

/// GET /doctors - List all doctors
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Vec<Doctor>>> {
    Ok(Json(state.records().list_doctors().await?))
}

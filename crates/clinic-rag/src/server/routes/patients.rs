//! Patient registration and listing endpoints

use axum::{extract::State, Form, Json};
use serde::Deserialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::record::Patient;

/// Form body for `POST /patients/create`
#[derive(Debug, Deserialize)]
pub struct CreatePatientForm {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// POST /patients/create - Register a new patient
pub async fn create_patient(
    State(state): State<AppState>,
    Form(form): Form<CreatePatientForm>,
) -> Result<Json<Patient>> {
    let patient = state
        .records()
        .create_patient(form.name, form.age, form.gender)
        .await?;

    tracing::info!("Registered patient {} ({})", patient.name, patient.id);
    Ok(Json(patient))
}

/// GET /patients - List all patients
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>> {
    Ok(Json(state.records().list_patients().await?))
}

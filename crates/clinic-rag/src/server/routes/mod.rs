//! API routes for the clinic server

pub mod doctors;
pub mod patients;
pub mod visits;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Patient management
        .route("/patients/create", post(patients::create_patient))
        .route("/patients", get(patients::list_patients))
        // Doctor management
        .route("/doctors/create", post(doctors::create_doctor))
        .route("/doctors", get(doctors::list_doctors))
        // Visits
        .route("/visits/create", post(visits::create_visit))
        .route("/visits/history/:patient_id", get(visits::visit_history))
        // Ingestion - with larger body limit for image uploads
        .route(
            "/visits/:visit_id/upload",
            post(visits::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Chat
        .route("/visits/:visit_id/chat", post(visits::chat))
}

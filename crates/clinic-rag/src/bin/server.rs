//! Clinic backend binary
//!
//! Run with: cargo run -p clinic-rag --bin clinic-rag-server

use clinic_rag::{server::ClinicServer, AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Generation model: {}", config.google.generation_model);
    tracing::info!(
        "  - Embedding model: {} ({} dims)",
        config.google.embedding_model,
        config.google.dimensions
    );
    tracing::info!("  - Retrieval top_k: {}", config.retrieval.top_k);
    tracing::info!("  - Data dir: {}", config.storage.data_dir.display());

    if config.google.api_key.is_empty() {
        tracing::warn!("GOOGLE_API_KEY is not set; model calls will fail");
    }
    if config.pinecone.api_key.is_empty() || config.pinecone.index_host.is_empty() {
        tracing::warn!("Pinecone is not configured; set PINECONE_API_KEY and PINECONE_INDEX_HOST");
    }

    // Create and start server
    let server = ClinicServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /patients/create            - Register a patient");
    println!("  GET  /patients                   - List patients");
    println!("  POST /visits/create              - Start a visit");
    println!("  GET  /visits/history/:patient_id - Visit history");
    println!("  POST /visits/:visit_id/upload    - Upload prescription/X-ray");
    println!("  POST /visits/:visit_id/chat      - Ask about this patient");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

pub mod app;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::storage::{DiagramStorage, LocalStorage};

pub async fn start_server(port: u16, data_dir: &Path, cors_origin: Option<&str>) -> Result<()> {
    let storage: Arc<dyn DiagramStorage> = Arc::new(LocalStorage::new(data_dir));
    info!("Diagram storage at {}", data_dir.display());

    let app = app::create_app(storage, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health               - Health check");
    info!("  GET    /api/diagrams      - List saved diagrams (?filter=draft|saved)");
    info!("  POST   /api/diagrams      - Save or update a diagram");
    info!("  GET    /api/diagrams/:id  - Fetch a diagram");
    info!("  DELETE /api/diagrams/:id  - Delete a diagram");
}

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{diagrams, health};
use crate::storage::DiagramStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn DiagramStorage>,
}

pub async fn create_app(
    storage: Arc<dyn DiagramStorage>,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState { storage };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .context("invalid CORS origin")?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/diagrams",
            get(diagrams::list_diagrams).post(diagrams::upsert_diagram),
        )
        .route(
            "/diagrams/:id",
            get(diagrams::get_diagram).delete(diagrams::delete_diagram),
        )
}

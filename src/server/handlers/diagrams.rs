use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::errors::DiagramError;
use crate::server::app::AppState;
use crate::storage::SavedDiagram;

type ApiError = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn storage_error(err: DiagramError) -> ApiError {
    match err {
        DiagramError::MissingRequiredFields => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        DiagramError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "Diagram not found")
        }
        other => {
            error!("Diagram storage error: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
}

/// GET /api/diagrams
///
/// All saved diagrams, newest first. `?filter=draft` or `?filter=saved`
/// narrows the list to autosaved drafts or explicit saves.
pub async fn list_diagrams(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SavedDiagram>>, ApiError> {
    let mut diagrams = state.storage.list().await.map_err(storage_error)?;

    match params.filter.as_deref() {
        Some("draft") => diagrams.retain(|d| d.is_draft),
        Some("saved") => diagrams.retain(|d| !d.is_draft),
        _ => {}
    }

    Ok(Json(diagrams))
}

/// GET /api/diagrams/:id
pub async fn get_diagram(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedDiagram>, ApiError> {
    let diagram = state.storage.get(&id).await.map_err(storage_error)?;

    match diagram {
        Some(diagram) => Ok(Json(diagram)),
        None => Err(error_response(StatusCode::NOT_FOUND, "Diagram not found")),
    }
}

/// POST /api/diagrams
///
/// Upsert keyed by diagram id; `createdAt` survives updates, `updatedAt` is
/// refreshed by the store.
pub async fn upsert_diagram(
    State(state): State<AppState>,
    Json(payload): Json<SavedDiagram>,
) -> Result<Json<SavedDiagram>, ApiError> {
    let saved = state.storage.upsert(payload).await.map_err(storage_error)?;
    Ok(Json(saved))
}

/// DELETE /api/diagrams/:id
pub async fn delete_diagram(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.storage.remove(&id).await.map_err(storage_error)?;
    Ok(Json(json!({ "success": true })))
}

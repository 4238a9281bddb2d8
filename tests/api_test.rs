//! Integration tests for the diagram REST API.

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use procflow::graph::{Connection, DeviceCategory, DiagramGraph, NodeKind, Position};
use procflow::node_factory::create_node;
use procflow::server::app::create_app;
use procflow::storage::{DiagramStorage, LocalStorage, SavedDiagram};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Create a test server over a tempdir-backed local storage.
async fn setup_test_server() -> Result<(TestServer, TempDir)> {
    let dir = tempfile::tempdir()?;
    let storage: Arc<dyn DiagramStorage> = Arc::new(LocalStorage::new(dir.path()));

    let app = create_app(storage, Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, dir))
}

fn sample_diagram(id: &str, title: &str) -> SavedDiagram {
    let mut graph = DiagramGraph::new();
    graph.set_id(id);
    graph.set_title(title);

    let a = create_node(NodeKind::Process, Position::new(100.0, 100.0), None);
    let b = create_node(
        NodeKind::Device,
        Position::new(300.0, 100.0),
        Some(DeviceCategory::Metal),
    );
    let (a_id, b_id) = (a.id.clone(), b.id.clone());
    graph.add_node(a);
    graph.add_node(b);
    graph.add_edge(
        Connection {
            source: a_id,
            target: b_id,
            source_handle: Some("right".to_string()),
            target_handle: Some("left".to_string()),
        },
        None,
    );

    graph.snapshot(false)
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "procflow-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_diagram_crud_api() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    // Empty store lists as an empty array.
    let response = server.get("/api/diagrams").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let list: Vec<Value> = response.json();
    assert!(list.is_empty());

    // Create via upsert.
    let diagram = sample_diagram("d1", "Sorting line");
    let response = server.post("/api/diagrams").json(&diagram).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let saved: SavedDiagram = response.json();
    assert_eq!(saved.id, "d1");
    assert_eq!(saved.title, "Sorting line");
    assert!(saved.created_at.is_some());
    assert!(saved.updated_at.is_some());
    let created_at = saved.created_at;

    // Fetch by id returns the full node/edge payload.
    let response = server.get("/api/diagrams/d1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: SavedDiagram = response.json();
    assert_eq!(fetched.nodes.len(), 2);
    assert_eq!(fetched.edges.len(), 1);

    // Updating keeps one record and the original creation time.
    let mut updated = diagram.clone();
    updated.title = "Sorting line v2".to_string();
    let response = server.post("/api/diagrams").json(&updated).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/api/diagrams").await;
    let list: Vec<SavedDiagram> = response.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Sorting line v2");
    assert_eq!(list[0].created_at, created_at);

    // Delete.
    let response = server.delete("/api/diagrams/d1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let response = server.get("/api/diagrams/d1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_diagram_returns_404_body() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/api/diagrams/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Diagram not found");

    Ok(())
}

#[tokio::test]
async fn test_upsert_requires_id_and_title() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .post("/api/diagrams")
        .json(&json!({ "title": "no id" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing required fields: id, title");

    let response = server
        .post("/api/diagrams")
        .json(&json!({ "id": "d1", "title": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Nothing was stored.
    let response = server.get("/api/diagrams").await;
    let list: Vec<Value> = response.json();
    assert!(list.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_filter_separates_drafts() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let saved = sample_diagram("d-final", "Final save");
    let mut draft = sample_diagram("d-draft", "Autosave");
    draft.is_draft = true;

    server.post("/api/diagrams").json(&saved).await;
    server.post("/api/diagrams").json(&draft).await;

    let response = server.get("/api/diagrams?filter=draft").await;
    let drafts: Vec<SavedDiagram> = response.json();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, "d-draft");

    let response = server.get("/api/diagrams?filter=saved").await;
    let finals: Vec<SavedDiagram> = response.json();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].id, "d-final");

    let response = server.get("/api/diagrams").await;
    let all: Vec<SavedDiagram> = response.json();
    assert_eq!(all.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_diagram_succeeds() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.delete("/api/diagrams/missing").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    Ok(())
}

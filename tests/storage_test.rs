//! Persistence gateway tests against the file-backed implementation.

use anyhow::Result;
use procflow::errors::DiagramError;
use procflow::graph::{DiagramGraph, NodeKind, Position};
use procflow::node_factory::create_node;
use procflow::storage::{DiagramStorage, LocalStorage, SavedDiagram};

fn diagram(id: &str, title: &str) -> SavedDiagram {
    let mut graph = DiagramGraph::new();
    graph.set_id(id);
    graph.set_title(title);
    graph.add_node(create_node(NodeKind::Process, Position::new(0.0, 0.0), None));
    graph.snapshot(false)
}

#[tokio::test]
async fn get_unknown_id_is_none_not_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    assert!(storage.get("missing").await?.is_none());
    assert!(storage.list().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn upsert_inserts_then_updates_in_place() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    let first = storage.upsert(diagram("d1", "T")).await?;
    assert_eq!(storage.list().await?.len(), 1);
    let created_at = first.created_at;
    assert!(created_at.is_some());

    tokio::time::sleep(std::time::Duration::from_millis(15)).await;

    let second = storage.upsert(diagram("d1", "T2")).await?;
    let listed = storage.list().await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "T2");
    assert_eq!(second.created_at, created_at);
    assert!(second.updated_at > first.updated_at);

    Ok(())
}

#[tokio::test]
async fn saving_an_unchanged_payload_is_idempotent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    let payload = diagram("d1", "T");
    let first = storage.upsert(payload.clone()).await?;
    tokio::time::sleep(std::time::Duration::from_millis(15)).await;
    let second = storage.upsert(payload).await?;

    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.nodes, first.nodes);
    assert_eq!(second.edges, first.edges);
    assert_eq!(second.title, first.title);
    assert_ne!(second.updated_at, first.updated_at);
    assert_eq!(storage.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn upsert_rejects_missing_id_or_title() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    let mut no_title = diagram("d1", "T");
    no_title.title = String::new();
    let err = storage.upsert(no_title).await.unwrap_err();
    assert!(matches!(err, DiagramError::MissingRequiredFields));

    let mut no_id = diagram("d1", "T");
    no_id.id = "   ".to_string();
    let err = storage.upsert(no_id).await.unwrap_err();
    assert!(matches!(err, DiagramError::MissingRequiredFields));

    // The failed saves left no partial state behind.
    assert!(storage.list().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn list_orders_by_updated_at_descending() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    storage.upsert(diagram("old", "Old")).await?;
    tokio::time::sleep(std::time::Duration::from_millis(15)).await;
    storage.upsert(diagram("new", "New")).await?;
    tokio::time::sleep(std::time::Duration::from_millis(15)).await;
    storage.upsert(diagram("old", "Old again")).await?;

    let ids: Vec<String> = storage.list().await?.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["old".to_string(), "new".to_string()]);

    Ok(())
}

#[tokio::test]
async fn remove_deletes_only_the_named_record() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    storage.upsert(diagram("d1", "One")).await?;
    storage.upsert(diagram("d2", "Two")).await?;

    storage.remove("d1").await?;
    let listed = storage.list().await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "d2");

    // Removing an unknown id succeeds quietly.
    storage.remove("missing").await?;
    assert_eq!(storage.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn records_survive_a_storage_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let storage = LocalStorage::new(dir.path());
        storage.upsert(diagram("d1", "Persisted")).await?;
    }

    let reopened = LocalStorage::new(dir.path());
    let fetched = reopened.get("d1").await?.expect("record should persist");
    assert_eq!(fetched.title, "Persisted");
    assert_eq!(fetched.nodes.len(), 1);

    Ok(())
}

#[tokio::test]
async fn corrupt_storage_file_surfaces_as_format_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());
    std::fs::write(storage.path(), "[{broken")?;

    let err = storage.list().await.unwrap_err();
    assert!(matches!(err, DiagramError::InvalidFormat(_)));

    Ok(())
}

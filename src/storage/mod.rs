pub mod local;
pub mod remote;

pub use local::LocalStorage;
pub use remote::RemoteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DiagramError;
use crate::graph::{Edge, Node};

/// The persisted snapshot of a diagram. `id` is stable across saves of the
/// same diagram (upsert semantics); timestamps are assigned by the backing
/// store, never trusted from the client on update.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedDiagram {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_draft: bool,
}

impl SavedDiagram {
    pub fn validate(&self) -> Result<(), DiagramError> {
        if self.id.trim().is_empty() || self.title.trim().is_empty() {
            return Err(DiagramError::MissingRequiredFields);
        }
        Ok(())
    }
}

/// Save/load/list/delete for named diagrams over a backing store. The graph
/// store and the services only talk to the store through this trait; the
/// device-local and remote-API implementations are interchangeable at
/// composition time.
///
/// `get` with an unknown id is a normal `Ok(None)` result. Any I/O failure
/// propagates as an error; it is never swallowed.
#[async_trait]
pub trait DiagramStorage: Send + Sync {
    /// All saved diagrams, newest `updatedAt` first.
    async fn list(&self) -> Result<Vec<SavedDiagram>, DiagramError>;

    async fn get(&self, id: &str) -> Result<Option<SavedDiagram>, DiagramError>;

    /// Inserts the record if its id is unseen, otherwise updates every field
    /// while preserving the original `createdAt`. `updatedAt` is refreshed
    /// on every call. Returns the record as stored.
    async fn upsert(&self, diagram: SavedDiagram) -> Result<SavedDiagram, DiagramError>;

    async fn remove(&self, id: &str) -> Result<(), DiagramError>;
}

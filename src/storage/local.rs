//! Device-local persistence: the diagram list lives in one JSON document
//! under a well-known file name inside the data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{DiagramStorage, SavedDiagram};
use crate::errors::DiagramError;

pub const STORAGE_FILE: &str = "diagrams.json";

pub struct LocalStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles on the storage file.
    lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<SavedDiagram>, DiagramError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_all(&self, records: &[SavedDiagram]) -> Result<(), DiagramError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl DiagramStorage for LocalStorage {
    async fn list(&self) -> Result<Vec<SavedDiagram>, DiagramError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<SavedDiagram>, DiagramError> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|d| d.id == id))
    }

    async fn upsert(&self, diagram: SavedDiagram) -> Result<SavedDiagram, DiagramError> {
        diagram.validate()?;

        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let now = Utc::now();

        let mut stored = diagram;
        match records.iter().position(|d| d.id == stored.id) {
            Some(idx) => {
                // Update in place, keeping the original creation time.
                stored.created_at = records[idx].created_at.or(stored.created_at).or(Some(now));
                stored.updated_at = Some(now);
                records[idx] = stored.clone();
            }
            None => {
                stored.created_at = stored.created_at.or(Some(now));
                stored.updated_at = Some(now);
                records.push(stored.clone());
            }
        }

        self.write_all(&records).await?;
        debug!("Upserted diagram {} ({} records)", stored.id, records.len());
        Ok(stored)
    }

    async fn remove(&self, id: &str) -> Result<(), DiagramError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        records.retain(|d| d.id != id);
        self.write_all(&records).await
    }
}

//! Remote persistence over the diagram HTTP API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{DiagramStorage, SavedDiagram};
use crate::errors::DiagramError;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RemoteStorage {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStorage {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn error_from(response: reqwest::Response) -> DiagramError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => "unexpected response from diagram API".to_string(),
        };
        DiagramError::Remote { status, message }
    }
}

#[async_trait]
impl DiagramStorage for RemoteStorage {
    async fn list(&self) -> Result<Vec<SavedDiagram>, DiagramError> {
        let response = self.client.get(self.url("/diagrams")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn get(&self, id: &str) -> Result<Option<SavedDiagram>, DiagramError> {
        let response = self
            .client
            .get(self.url(&format!("/diagrams/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(Some(response.json().await?))
    }

    async fn upsert(&self, diagram: SavedDiagram) -> Result<SavedDiagram, DiagramError> {
        diagram.validate()?;
        let response = self
            .client
            .post(self.url("/diagrams"))
            .json(&diagram)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn remove(&self, id: &str) -> Result<(), DiagramError> {
        let response = self
            .client
            .delete(self.url(&format!("/diagrams/{id}")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}

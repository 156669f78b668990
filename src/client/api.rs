use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::services::item_service::DeleteSummary;
use crate::state::items::{Item, ItemId};

#[derive(Error, Debug)]
pub enum ClientError {
    /// The target item (or, for delete-all, any item) no longer exists.
    #[error("not found")]
    NotFound,

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The item operations a UI controller needs.
#[async_trait]
pub trait ItemsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, ClientError>;

    async fn create(&self, name: &str) -> Result<Item, ClientError>;

    async fn update(&self, id: &ItemId, name: &str) -> Result<Item, ClientError>;

    async fn delete(&self, id: &ItemId) -> Result<(), ClientError>;

    /// Returns how many items the server removed.
    async fn delete_all(&self) -> Result<usize, ClientError>;
}

/// `ItemsApi` over HTTP against a running server.
#[derive(Debug, Clone)]
pub struct HttpItemsApi {
    client: Client,
    base_url: String,
}

impl HttpItemsApi {
    /// `base_url` is the collection URL, e.g. `http://127.0.0.1:5000/api/items`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: &ItemId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }

        let message = resp.text().await.unwrap_or_default();
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ItemsApi for HttpItemsApi {
    async fn list(&self) -> Result<Vec<Item>, ClientError> {
        let resp = self.client.get(&self.base_url).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create(&self, name: &str) -> Result<Item, ClientError> {
        let resp = self
            .client
            .post(&self.base_url)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn update(&self, id: &ItemId, name: &str) -> Result<Item, ClientError> {
        let resp = self
            .client
            .put(self.item_url(id))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ClientError> {
        let resp = self.client.delete(self.item_url(id)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<usize, ClientError> {
        let resp = self.client.delete(&self.base_url).send().await?;
        let summary: DeleteSummary = Self::check(resp).await?.json().await?;
        Ok(summary.deleted_count)
    }
}

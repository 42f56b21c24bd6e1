//! HTTP client for a remote row-oriented store

use async_trait::async_trait;
use hexhold_core::persist::{StateStore, StoreError};
use serde_json::Value;

/// Client for a backend exposing `GET`/`PUT /levels/{level}/{table}`
#[derive(Clone, Debug)]
pub struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, level: &str, table: &str) -> String {
        format!("{}/levels/{level}/{table}", self.base_url)
    }
}

#[async_trait]
impl StateStore for HttpStore {
    async fn load(&self, level: &str, table: &str) -> Result<Option<Value>, StoreError> {
        let url = self.table_url(level, table);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| StoreError::Backend(format!("GET {url}: {err}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|err| StoreError::Backend(format!("GET {url}: {err}")))?;
        let value = response
            .json()
            .await
            .map_err(|err| StoreError::Backend(format!("decoding {url}: {err}")))?;
        Ok(Some(value))
    }

    async fn save(&self, level: &str, table: &str, data: Value) -> Result<(), StoreError> {
        let url = self.table_url(level, table);
        self.client
            .put(&url)
            .json(&data)
            .send()
            .await
            .map_err(|err| StoreError::Backend(format!("PUT {url}: {err}")))?
            .error_for_status()
            .map_err(|err| StoreError::Backend(format!("PUT {url}: {err}")))?;
        Ok(())
    }
}

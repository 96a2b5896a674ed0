//! Where the remote half of the catalog comes from

use super::CatalogRecord;
use crate::error::{QuireError, Result};
use crate::remote::RemoteContentStore;
use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;
use std::sync::Arc;

/// Provider of the remotely published catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CatalogRecord>>;
}

/// Parse a catalog document (a JSON array of records)
///
/// Elements that are not objects are skipped.
pub fn parse_catalog(data: &[u8]) -> Result<Vec<CatalogRecord>> {
    let items = match serde_json::from_slice::<Value>(data) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            return Err(QuireError::Validation(
                "catalog is not a JSON array".to_string(),
            ))
        }
        Err(e) => return Err(QuireError::Validation(format!("malformed catalog: {}", e))),
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Reads the catalog file from a remote content store
pub struct StoreCatalogSource {
    store: Arc<dyn RemoteContentStore>,
    path: String,
}

impl StoreCatalogSource {
    pub fn new(store: Arc<dyn RemoteContentStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for StoreCatalogSource {
    async fn fetch(&self) -> Result<Vec<CatalogRecord>> {
        match self.store.read_file(&self.path).await? {
            Some(file) => parse_catalog(&file.content),
            None => Ok(Vec::new()),
        }
    }
}

/// Fetches a served library document over HTTP, bypassing caches
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<CatalogRecord>> {
        let response = self
            .client
            .get(&self.url)
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuireError::Remote {
                status: response.status().as_u16(),
                message: "no remote library".to_string(),
            });
        }

        let data = response.bytes().await?;
        parse_catalog(&data)
    }
}

/// A fixed catalog, for offline use and tests
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(pub Vec<CatalogRecord>);

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> Result<Vec<CatalogRecord>> {
        Ok(self.0.clone())
    }
}

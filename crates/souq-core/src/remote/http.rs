//! HTTP implementation of the remote document store

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{ProductId, RemoteProduct};
use crate::util::is_http_url;

use super::RemoteStore;

/// Collection name under the base URL
const COLLECTION: &str = "products";

/// Remote store backed by a JSON document API.
///
/// Documents live at `{base}/products/{id}.json`; the collection snapshot
/// is a single `GET {base}/products.json` returning a map of id to
/// document (or JSON `null` when the collection is empty).
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    /// Create a client for the given base URL with a fixed request timeout.
    ///
    /// The timeout is the whole budget for each remote read/write; a
    /// timed-out request surfaces as a per-record failure to the caller.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    fn collection_url(&self) -> String {
        format!("{}/{COLLECTION}.json", self.base_url)
    }

    fn document_url(&self, id: ProductId) -> String {
        format!("{}/{COLLECTION}/{id}.json", self.base_url)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_all(&self) -> Result<Vec<RemoteProduct>> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await?
            .error_for_status()?;

        // The collection endpoint returns null when no documents exist
        let snapshot: Option<HashMap<String, RemoteProduct>> = response.json().await?;
        let mut docs: Vec<RemoteProduct> = snapshot.unwrap_or_default().into_values().collect();
        docs.sort_by_key(|doc| doc.id);
        Ok(docs)
    }

    async fn put(&self, doc: &RemoteProduct) -> Result<()> {
        self.client
            .put(self.document_url(doc.product_id()))
            .json(doc)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn remove(&self, id: ProductId) -> Result<()> {
        self.client
            .delete(self.document_url(id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "remote base URL must not be empty".to_string(),
        ));
    }
    if is_http_url(trimmed) {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "remote base URL must include http:// or https://".to_string(),
        ))
    }
}

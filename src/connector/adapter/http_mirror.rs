use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::application::interfaces::MirrorAdapter;
use crate::domain::{Document, DomainError};

/// Fans documents out to an external search engine (Meilisearch, Typesense,
/// OpenSearch, ...) over its HTTP index API. Mirror failures are always
/// reported to the caller, who is expected to log and continue — a mirror
/// is never on the critical path of the query path.
pub struct HttpMirror {
    name: String,
    client: Client,
    index_url: String,
    api_key: Option<String>,
}

impl HttpMirror {
    pub fn new(name: impl Into<String>, index_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            name: name.into(),
            client: Client::new(),
            index_url: index_url.into(),
            api_key,
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn to_json(doc: &Document) -> serde_json::Value {
        json!({
            "id": doc.id(),
            "title": doc.title(),
            "body": doc.body(),
            "tags": doc.tags(),
            "url": doc.url(),
            "domain": doc.domain(),
            "lang": doc.lang(),
            "country": doc.country(),
        })
    }
}

#[async_trait]
impl MirrorAdapter for HttpMirror {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, docs: &[Document]) -> Result<(), DomainError> {
        if docs.is_empty() {
            return Ok(());
        }

        let payload: Vec<serde_json::Value> = docs.iter().map(Self::to_json).collect();
        let request = self.authorize(self.client.post(&self.index_url).json(&payload));

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::store_unavailable(format!("mirror {} upsert request failed: {e}", self.name)))?;

        if !response.status().is_success() {
            return Err(DomainError::store_unavailable(format!(
                "mirror {} upsert returned status {}",
                self.name,
                response.status()
            )));
        }

        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }

        let url = format!("{}/delete-batch", self.index_url.trim_end_matches('/'));
        let request = self.authorize(self.client.post(&url).json(&ids));

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::store_unavailable(format!("mirror {} delete request failed: {e}", self.name)))?;

        if !response.status().is_success() {
            warn!(mirror = %self.name, status = %response.status(), "mirror delete returned non-success status");
            return Err(DomainError::store_unavailable(format!(
                "mirror {} delete returned status {}",
                self.name,
                response.status()
            )));
        }

        Ok(())
    }
}

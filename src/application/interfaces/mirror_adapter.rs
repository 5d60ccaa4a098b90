use async_trait::async_trait;

use crate::domain::{Document, DomainError};

/// External mirror indexer (Meilisearch, Typesense, OpenSearch, ...). Mirror
/// failures are logged by the indexer, never fatal.
#[async_trait]
pub trait MirrorAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn upsert(&self, docs: &[Document]) -> Result<(), DomainError>;

    async fn delete(&self, ids: &[String]) -> Result<(), DomainError>;

    async fn flush(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

use async_trait::async_trait;

use crate::domain::{CandidateRow, Document, DomainError};

/// Persistent relational + vector storage: two query shapes (lexical,
/// semantic) plus bulk upsert/delete and idempotent schema bootstrap.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Weighted full-text search over `title`/`body`/`tags`, scoped to
    /// `country`. Ordered by `score_raw` descending, ties broken by
    /// `updated_at` descending then `id` ascending. Honors `limit` exactly.
    async fn lexical_search(
        &self,
        country: &str,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRow>, DomainError>;

    /// Cosine-similarity search over documents with a non-null embedding,
    /// scoped to `country`. Ordered by `score_vector` descending, ties
    /// broken by `updated_at` then `id`. Honors `limit` exactly.
    async fn semantic_search(
        &self,
        query_vector: &[f32],
        country: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRow>, DomainError>;

    /// Upserts a chunk of documents in one transaction. Returns the number
    /// of rows written.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize, DomainError>;

    /// Deletes documents by id. Returns the number of rows removed.
    async fn delete_batch(&self, ids: &[String]) -> Result<usize, DomainError>;

    /// Looks up the currently stored embedding for a document, if any —
    /// used by the indexer to implement `embedding = COALESCE(new, existing)`.
    async fn find_embedding(&self, id: &str) -> Result<Option<Vec<f32>>, DomainError>;

    /// Creates tables, generated columns and indexes if they do not already
    /// exist. Idempotent.
    async fn ensure_schema(&self) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

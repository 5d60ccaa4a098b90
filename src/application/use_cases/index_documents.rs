use std::sync::Arc;

use tracing::{info, warn};

use crate::application::interfaces::{DocumentStore, EmbeddingClient, MirrorAdapter};
use crate::domain::{Document, DomainError};

/// Default chunk size for transactional upserts.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

pub struct UpsertOutcome {
    pub indexed: usize,
    pub skipped: usize,
}

/// Bulk upsert/delete with embedding backfill, chunked transactional writes
/// and optional mirror-adapter fan-out.
pub struct Indexer {
    store: Option<Arc<dyn DocumentStore>>,
    embedder: Option<Arc<dyn EmbeddingClient>>,
    mirrors: Vec<Arc<dyn MirrorAdapter>>,
    chunk_size: usize,
}

impl Indexer {
    pub fn new(store: Option<Arc<dyn DocumentStore>>, embedder: Option<Arc<dyn EmbeddingClient>>) -> Self {
        Self {
            store,
            embedder,
            mirrors: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn MirrorAdapter>) -> Self {
        self.mirrors.push(mirror);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        match &self.store {
            Some(store) => store.ensure_schema().await,
            None => Ok(()),
        }
    }

    pub async fn upsert(&self, docs: Vec<Document>) -> Result<UpsertOutcome, DomainError> {
        let Some(store) = &self.store else {
            return Ok(UpsertOutcome {
                indexed: 0,
                skipped: docs.len(),
            });
        };

        let mut indexed = 0;
        let mut skipped = 0;

        for chunk in docs.chunks(self.chunk_size) {
            let prepared = self.backfill_embeddings(store, chunk).await;
            let written = store.upsert_batch(&prepared).await.map_err(|err| {
                DomainError::indexer_partial_failure(format!(
                    "chunk upsert of {} documents failed: {err}",
                    prepared.len()
                ))
            })?;
            indexed += written;
            skipped += prepared.len() - written;

            for mirror in &self.mirrors {
                if let Err(err) = mirror.upsert(&prepared).await {
                    warn!(mirror = mirror.name(), error = %err, "mirror upsert failed");
                }
            }
        }

        info!(indexed, skipped, "upsert complete");
        Ok(UpsertOutcome { indexed, skipped })
    }

    pub async fn delete(&self, ids: Vec<String>) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let removed = match &self.store {
            Some(store) => store.delete_batch(&ids).await?,
            None => 0,
        };

        for mirror in &self.mirrors {
            if let Err(err) = mirror.delete(&ids).await {
                warn!(mirror = mirror.name(), error = %err, "mirror delete failed");
            }
        }

        Ok(removed)
    }

    pub async fn run_delta(&self, documents: Vec<Document>, deletions: Vec<String>) -> Result<UpsertOutcome, DomainError> {
        let outcome = self.upsert(documents).await?;
        self.delete(deletions).await?;
        Ok(outcome)
    }

    /// Computes embeddings for documents that arrived without one, applying
    /// `embedding = COALESCE(new, existing)` against the stored value.
    async fn backfill_embeddings(&self, store: &Arc<dyn DocumentStore>, chunk: &[Document]) -> Vec<Document> {
        let mut prepared = Vec::with_capacity(chunk.len());

        for doc in chunk {
            let mut doc = doc.clone();

            if doc.embedding().is_none() {
                if let Some(embedder) = &self.embedder {
                    match embedder.embed(&doc.embedding_source_text()).await {
                        Ok(vector) => doc = doc.with_embedding(vector),
                        Err(err) => {
                            warn!(id = doc.id(), error = %err, "embedding backfill failed, retaining existing");
                        }
                    }
                }
            }

            if doc.embedding().is_none() {
                if let Ok(Some(existing)) = store.find_embedding(doc.id()).await {
                    doc = doc.with_embedding(existing);
                }
            }

            prepared.push(doc);
        }

        prepared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CandidateRow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        upserted: Mutex<Vec<Document>>,
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn lexical_search(&self, _c: &str, _q: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![])
        }
        async fn semantic_search(&self, _v: &[f32], _c: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![])
        }
        async fn upsert_batch(&self, docs: &[Document]) -> Result<usize, DomainError> {
            self.upserted.lock().unwrap().extend_from_slice(docs);
            Ok(docs.len())
        }
        async fn delete_batch(&self, ids: &[String]) -> Result<usize, DomainError> {
            Ok(ids.len())
        }
        async fn find_embedding(&self, _id: &str) -> Result<Option<Vec<f32>>, DomainError> {
            Ok(None)
        }
        async fn ensure_schema(&self) -> Result<(), DomainError> {
            Ok(())
        }
        async fn count(&self) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn no_store_skips_everything() {
        let indexer = Indexer::new(None, None);
        let outcome = indexer
            .upsert(vec![Document::new("1", "t", "b", "u", "d", "us")])
            .await
            .unwrap();
        assert_eq!(outcome.indexed, 0);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn upserts_in_chunks() {
        let store = Arc::new(RecordingStore::default());
        let indexer = Indexer::new(Some(store.clone()), None).with_chunk_size(2);
        let docs: Vec<Document> = (0..5).map(|i| Document::new(i.to_string(), "t", "b", "u", "d", "us")).collect();
        let outcome = indexer.upsert(docs).await.unwrap();
        assert_eq!(outcome.indexed, 5);
        assert_eq!(store.upserted.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn empty_deletion_list_is_noop() {
        let indexer = Indexer::new(None, None);
        let removed = indexer.delete(vec![]).await.unwrap();
        assert_eq!(removed, 0);
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn lexical_search(&self, _c: &str, _q: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![])
        }
        async fn semantic_search(&self, _v: &[f32], _c: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![])
        }
        async fn upsert_batch(&self, _docs: &[Document]) -> Result<usize, DomainError> {
            Err(DomainError::store_unavailable("write rejected"))
        }
        async fn delete_batch(&self, ids: &[String]) -> Result<usize, DomainError> {
            Ok(ids.len())
        }
        async fn find_embedding(&self, _id: &str) -> Result<Option<Vec<f32>>, DomainError> {
            Ok(None)
        }
        async fn ensure_schema(&self) -> Result<(), DomainError> {
            Ok(())
        }
        async fn count(&self) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn db_write_failure_aborts_and_surfaces_indexer_partial_failure() {
        let store = Arc::new(FailingStore);
        let indexer = Indexer::new(Some(store), None);
        let result = indexer.upsert(vec![Document::new("1", "t", "b", "u", "d", "us")]).await;
        assert!(matches!(result, Err(DomainError::IndexerPartialFailure(_))));
    }
}

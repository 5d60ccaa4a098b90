use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::application::interfaces::{DocumentStore, EmbeddingClient};
use crate::domain::{CandidateRow, DomainError, NormalizedQuery};

/// Runs the lexical and semantic branches concurrently, embedding the query
/// text at most once, and enforces the engine-wide deadline around the pair.
///
/// Degradation is fail-closed: an embedding failure or a single store-branch
/// error drops that channel and proceeds with whatever the other produced.
/// Only when *both* channels are unusable does this return
/// [`DomainError::RetrievalFailed`].
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

pub struct RetrievedCandidates {
    pub lexical: Vec<CandidateRow>,
    pub semantic: Vec<CandidateRow>,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    pub async fn retrieve(
        &self,
        query: &NormalizedQuery,
        pool: usize,
        deadline_ms: u64,
    ) -> Result<RetrievedCandidates, DomainError> {
        let start = Instant::now();

        let fut = self.dispatch(query, pool);

        match tokio::time::timeout(Duration::from_millis(deadline_ms), fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(elapsed_ms = start.elapsed().as_millis() as u64, "retrieval deadline exceeded");
                Err(DomainError::Timeout(deadline_ms))
            }
        }
    }

    async fn dispatch(&self, query: &NormalizedQuery, pool: usize) -> Result<RetrievedCandidates, DomainError> {
        let embedding = match self.embedder.embed(query.text()).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                warn!(error = %err, "embedding unavailable, degrading to lexical-only");
                None
            }
        };

        let lexical_fut = self.store.lexical_search(query.country(), query.text(), pool);

        let (lexical, semantic) = match embedding {
            Some(vector) => {
                let semantic_fut = self.store.semantic_search(&vector, query.country(), pool);
                let (lexical, semantic) = tokio::join!(lexical_fut, semantic_fut);
                (lexical, Some(semantic))
            }
            None => (lexical_fut.await, None),
        };

        let lexical = match lexical {
            Ok(rows) => Some(rows),
            Err(err) => {
                warn!(error = %err, "lexical branch failed");
                None
            }
        };

        let semantic = match semantic {
            Some(Ok(rows)) => Some(rows),
            Some(Err(err)) => {
                warn!(error = %err, "semantic branch failed");
                None
            }
            None => None,
        };

        debug!(
            lexical = lexical.as_ref().map(Vec::len).unwrap_or(0),
            semantic = semantic.as_ref().map(Vec::len).unwrap_or(0),
            "retrieval dispatch complete"
        );

        match (lexical, semantic) {
            (None, None) => Err(DomainError::RetrievalFailed),
            (lexical, semantic) => Ok(RetrievedCandidates {
                lexical: lexical.unwrap_or_default(),
                semantic: semantic.unwrap_or_default(),
            }),
        }
    }
}

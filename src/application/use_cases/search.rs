use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::application::interfaces::{CacheStore, DocumentStore, EmbeddingClient};
use crate::application::use_cases::fuse::fuse;
use crate::application::use_cases::normalize_query::normalize_query;
use crate::application::use_cases::retrieve::Retriever;
use crate::domain::{CacheEntry, DomainError, EngineConfig, FusedResult, RawQuery};

/// Top-level query path: normalize → cache lookup → (on miss) retrieve →
/// fuse → cache write → response.
///
/// A cache-store failure never fails the request: [`CacheStore`]
/// implementations are required to surface unavailability as
/// `DomainError::CacheUnavailable`, which this use case treats as a miss.
pub struct SearchUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingClient>,
    cache: Arc<dyn CacheStore>,
    config: EngineConfig,
}

impl SearchUseCase {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingClient>,
        cache: Arc<dyn CacheStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            cache,
            config,
        }
    }

    pub async fn execute(&self, raw: RawQuery) -> Result<Vec<FusedResult>, DomainError> {
        let query = normalize_query(raw, self.config.default_k)?;
        let key = query.fingerprint();

        match self.cache.get(&key).await {
            Ok(Some(entry)) if entry.is_valid_at(Utc::now()) => {
                debug!(key, "cache hit");
                return Ok(entry.into_value());
            }
            Ok(Some(_)) => debug!(key, "cache entry expired"),
            Ok(None) => debug!(key, "cache miss"),
            Err(err) => debug!(key, error = %err, "cache unavailable, treating as miss"),
        }

        let retriever = Retriever::new(self.store.clone(), self.embedder.clone());
        let pool = self.config.candidate_pool_size(query.k());
        let candidates = retriever.retrieve(&query, pool, self.config.deadline_ms).await?;

        let results = fuse(
            candidates.lexical,
            candidates.semantic,
            &query,
            self.config.weights,
            Utc::now(),
        );

        if let Err(err) = self
            .cache
            .set(&key, results.clone(), self.config.default_ttl_ms)
            .await
        {
            debug!(key, error = %err, "failed to populate cache, continuing");
        }

        info!(key, hits = results.len(), "search complete");
        Ok(results)
    }
}

use async_trait::async_trait;

use crate::domain::{CacheEntry, DomainError, FusedResult};

/// Key/value layer with TTL-bearing entries. Backends (in-memory, external
/// KV) must treat `CacheUnavailable` as a miss — callers never fail a
/// request because the cache is down.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError>;

    async fn set(&self, key: &str, value: Vec<FusedResult>, ttl_ms: u64) -> Result<(), DomainError>;

    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}

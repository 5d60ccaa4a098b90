use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::interfaces::CacheStore;
use crate::domain::{CacheEntry, DomainError, FusedResult};

/// Default, test-friendly cache backend: a shared `HashMap` guarded by a
/// single `RwLock`. Expired entries are evicted lazily, on the next `get`.
#[derive(Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<FusedResult>, ttl_ms: u64) -> Result<(), DomainError> {
        let entry = CacheEntry::new(value, Utc::now(), ttl_ms);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

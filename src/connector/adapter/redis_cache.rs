use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use tracing::warn;

use crate::application::interfaces::CacheStore;
use crate::domain::{CacheEntry, DomainError, FusedResult};

/// External KV cache backend over a pooled Redis connection. Pool exhaustion
/// or connection errors surface as `CacheUnavailable`, which callers treat
/// as a cache miss rather than a request failure.
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(redis_url: &str) -> Result<Self, DomainError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| DomainError::cache_unavailable(format!("failed to create redis pool: {e}")))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("failed to acquire redis connection: {e}")))?;

        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("redis GET failed: {e}")))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| DomainError::cache_unavailable(format!("failed to deserialize cache entry: {e}"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<FusedResult>, ttl_ms: u64) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("failed to acquire redis connection: {e}")))?;

        let entry = CacheEntry::new(value, chrono::Utc::now(), ttl_ms);
        let json = serde_json::to_string(&entry)
            .map_err(|e| DomainError::cache_unavailable(format!("failed to serialize cache entry: {e}")))?;

        let ttl_secs = (ttl_ms / 1_000).max(1);
        conn.set_ex::<_, _, ()>(key, json, ttl_secs)
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("redis SETEX failed: {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("failed to acquire redis connection: {e}")))?;

        match conn.del::<_, ()>(key).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "redis DEL failed");
                Err(DomainError::cache_unavailable(format!("redis DEL failed: {e}")))
            }
        }
    }
}

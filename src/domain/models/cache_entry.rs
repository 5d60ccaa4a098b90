use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FusedResult;

/// Tagged cache envelope. Validity is `now < created_at + ttl_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    value: Vec<FusedResult>,
    created_at: DateTime<Utc>,
    ttl_ms: u64,
}

impl CacheEntry {
    pub fn new(value: Vec<FusedResult>, created_at: DateTime<Utc>, ttl_ms: u64) -> Self {
        Self {
            value,
            created_at,
            ttl_ms,
        }
    }

    pub fn value(&self) -> &[FusedResult] {
        &self.value
    }

    pub fn into_value(self) -> Vec<FusedResult> {
        self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let expires_at = self.created_at + chrono::Duration::milliseconds(self.ttl_ms as i64);
        now < expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_entry_is_invalid() {
        let created = Utc::now() - chrono::Duration::seconds(10);
        let entry = CacheEntry::new(vec![], created, 1_000);
        assert!(!entry.is_valid_at(Utc::now()));
    }

    #[test]
    fn fresh_entry_is_valid() {
        let entry = CacheEntry::new(vec![], Utc::now(), 60_000);
        assert!(entry.is_valid_at(Utc::now()));
    }
}

use serde::{Deserialize, Serialize};

/// Tunable fusion weights: `w_lex`, `w_vec`, `w_auth`, `w_fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub w_lexical: f32,
    pub w_vector: f32,
    pub w_authority: f32,
    pub w_freshness: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            w_lexical: 0.45,
            w_vector: 0.45,
            w_authority: 0.05,
            w_freshness: 0.05,
        }
    }
}

/// Engine-wide tunables, per the enumerated configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: RankingWeights,
    pub default_k: usize,
    pub default_ttl_ms: u64,
    pub deadline_ms: u64,
    /// Floor and multiplier for `candidatePoolSize = max(floor, multiplier * k)`.
    pub candidate_pool_floor: usize,
    pub candidate_pool_multiplier: usize,
}

impl EngineConfig {
    /// Per-branch candidate pool size for a query requesting `k` results.
    pub fn candidate_pool_size(&self, k: usize) -> usize {
        (self.candidate_pool_multiplier * k).max(self.candidate_pool_floor)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            default_k: super::DEFAULT_K,
            // Not specified upstream; this crate fixes a 5 minute default.
            default_ttl_ms: 300_000,
            deadline_ms: 1_500,
            candidate_pool_floor: 50,
            candidate_pool_multiplier: 5,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// A gold-labeled query used by the offline evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldQuery {
    pub query: String,
    pub country: String,
    #[serde(default)]
    pub expected_ids: Vec<String>,
    #[serde(default)]
    pub must_domains: Vec<String>,
    #[serde(default)]
    pub must_not_domains: Vec<String>,
    pub k: Option<usize>,
    pub time_window: Option<TimeWindow>,
}

/// Per-query evaluation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEvalResult {
    pub query: String,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub ndcg_at_k: f64,
    pub localization_accuracy: f64,
    pub latency_ms: f64,
}

/// Aggregate evaluation summary over a gold set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub per_query: Vec<QueryEvalResult>,
    pub average_precision: f64,
    pub average_recall: f64,
    pub average_ndcg: f64,
    pub localization_accuracy: f64,
    pub latency_p95_ms: f64,
}

impl EvalSummary {
    /// Minimum acceptable average precision for a passing eval run.
    pub const PRECISION_THRESHOLD: f64 = 0.30;
    /// Minimum acceptable mean localization accuracy for a passing eval run.
    pub const LOCALIZATION_THRESHOLD: f64 = 0.95;

    pub fn passes_thresholds(&self) -> bool {
        self.average_precision >= Self::PRECISION_THRESHOLD
            && self.localization_accuracy >= Self::LOCALIZATION_THRESHOLD
    }
}

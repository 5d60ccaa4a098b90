use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;

use crate::application::interfaces::{DocumentStore, EmbeddingClient};
use crate::application::use_cases::fuse::fuse;
use crate::application::use_cases::normalize_query::normalize_query;
use crate::application::use_cases::retrieve::Retriever;
use crate::domain::{DomainError, EngineConfig, EvalSummary, GoldQuery, QueryEvalResult, RawQuery};

/// Runs a gold-query set through the full retrieval + fusion path — no cache
/// shortcut — and scores each query against its expected ids.
pub struct Evaluator {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingClient>,
    config: EngineConfig,
}

impl Evaluator {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingClient>, config: EngineConfig) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    pub async fn run(&self, gold: &[GoldQuery]) -> Result<EvalSummary, DomainError> {
        let mut per_query = Vec::with_capacity(gold.len());

        for entry in gold {
            per_query.push(self.score_one(entry).await?);
        }

        let n = per_query.len().max(1) as f64;
        let average_precision = per_query.iter().map(|r| r.precision_at_k).sum::<f64>() / n;
        let average_recall = per_query.iter().map(|r| r.recall_at_k).sum::<f64>() / n;
        let average_ndcg = per_query.iter().map(|r| r.ndcg_at_k).sum::<f64>() / n;
        let localization_accuracy = per_query.iter().map(|r| r.localization_accuracy).sum::<f64>() / n;

        let mut latencies: Vec<f64> = per_query.iter().map(|r| r.latency_ms).collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let latency_p95_ms = latencies
            .get(((0.95 * latencies.len() as f64).floor() as usize).min(latencies.len().saturating_sub(1)))
            .copied()
            .unwrap_or(0.0);

        let summary = EvalSummary {
            per_query,
            average_precision,
            average_recall,
            average_ndcg,
            localization_accuracy,
            latency_p95_ms,
        };

        info!(
            precision = summary.average_precision,
            localization = summary.localization_accuracy,
            passes = summary.passes_thresholds(),
            "evaluation complete"
        );

        Ok(summary)
    }

    async fn score_one(&self, entry: &GoldQuery) -> Result<QueryEvalResult, DomainError> {
        let raw = RawQuery {
            text: entry.query.clone(),
            country: entry.country.clone(),
            k: entry.k,
            must_domains: entry.must_domains.clone(),
            must_not_domains: entry.must_not_domains.clone(),
            time_window: entry.time_window,
        };
        let query = normalize_query(raw, self.config.default_k)?;

        let start = Instant::now();
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
        let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;

        let expected: HashSet<&str> = entry.expected_ids.iter().map(String::as_str).collect();
        let retrieved_ids: Vec<&str> = results.iter().map(|r| r.document().id()).collect();
        let hits = retrieved_ids.iter().filter(|id| expected.contains(*id)).count();

        let precision_at_k = if retrieved_ids.is_empty() {
            0.0
        } else {
            hits as f64 / retrieved_ids.len() as f64
        };
        let recall_at_k = if expected.is_empty() {
            0.0
        } else {
            hits as f64 / expected.len() as f64
        };

        let dcg: f64 = retrieved_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let rel = if expected.contains(id) { 1.0 } else { 0.0 };
                rel / (i as f64 + 2.0).log2()
            })
            .sum();
        let idcg: f64 = (0..expected.len().min(retrieved_ids.len()))
            .map(|i| 1.0 / (i as f64 + 2.0).log2())
            .sum();
        let ndcg_at_k = if idcg > 0.0 { dcg / idcg } else { 0.0 };

        let localization_accuracy = if results
            .iter()
            .all(|r| r.document().country().eq_ignore_ascii_case(query.country()))
        {
            1.0
        } else {
            0.0
        };

        Ok(QueryEvalResult {
            query: entry.query.clone(),
            precision_at_k,
            recall_at_k,
            ndcg_at_k,
            localization_accuracy,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateRow, Document};
    use async_trait::async_trait;

    struct FixtureStore;

    #[async_trait]
    impl DocumentStore for FixtureStore {
        async fn lexical_search(&self, country: &str, _q: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![CandidateRow::lexical(
                Document::new("apple", "Apple Pie Recipe", "b", "u", "d", country),
                5.0,
            )])
        }
        async fn semantic_search(&self, _v: &[f32], _c: &str, _l: usize) -> Result<Vec<CandidateRow>, DomainError> {
            Ok(vec![])
        }
        async fn upsert_batch(&self, _d: &[Document]) -> Result<usize, DomainError> {
            Ok(0)
        }
        async fn delete_batch(&self, _i: &[String]) -> Result<usize, DomainError> {
            Ok(0)
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

    struct NullEmbedder;

    #[async_trait]
    impl EmbeddingClient for NullEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            Err(DomainError::embedding_unavailable("unused in this fixture"))
        }
        fn dimensions(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn perfect_match_scores_full_precision_and_localization() {
        let evaluator = Evaluator::new(Arc::new(FixtureStore), Arc::new(NullEmbedder), EngineConfig::default());
        let gold = vec![GoldQuery {
            query: "apple".into(),
            country: "us".into(),
            expected_ids: vec!["apple".into()],
            must_domains: vec![],
            must_not_domains: vec![],
            k: Some(2),
            time_window: None,
        }];
        let summary = evaluator.run(&gold).await.unwrap();
        assert_eq!(summary.average_precision, 1.0);
        assert_eq!(summary.localization_accuracy, 1.0);
        assert!(summary.passes_thresholds());
    }

    #[tokio::test]
    async fn no_expected_ids_yields_zero_recall() {
        let evaluator = Evaluator::new(Arc::new(FixtureStore), Arc::new(NullEmbedder), EngineConfig::default());
        let gold = vec![GoldQuery {
            query: "apple".into(),
            country: "us".into(),
            expected_ids: vec![],
            must_domains: vec![],
            must_not_domains: vec![],
            k: Some(2),
            time_window: None,
        }];
        let summary = evaluator.run(&gold).await.unwrap();
        assert_eq!(summary.average_recall, 0.0);
    }
}

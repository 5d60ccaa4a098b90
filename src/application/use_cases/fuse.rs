use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{CandidateRow, Document, FusedResult, NormalizedQuery, RankingWeights};

/// `fuse(lexical, semantic, query) -> FusedResult[]` of length `<= query.k()`.
///
/// Builds the union set by id, normalizes each channel by its observed
/// maximum, combines with [`RankingWeights`], applies domain filters, and
/// truncates to `k` with a stable tie-break. The fused score is only an
/// ordering device — values are not comparable across queries.
pub fn fuse(
    lexical: Vec<CandidateRow>,
    semantic: Vec<CandidateRow>,
    query: &NormalizedQuery,
    weights: RankingWeights,
    now: DateTime<Utc>,
) -> Vec<FusedResult> {
    let mut by_id: HashMap<String, Entry> = HashMap::new();

    let max_lex = lexical
        .iter()
        .filter_map(|c| c.score_raw())
        .fold(0.0_f32, f32::max);
    let max_vec = semantic
        .iter()
        .filter_map(|c| c.score_vector())
        .fold(0.0_f32, f32::max);

    for row in lexical {
        let score_raw = row.score_raw().unwrap_or(0.0);
        let entry = by_id
            .entry(row.document().id().to_string())
            .or_insert_with(|| Entry::new(row.document().clone()));
        entry.score_raw = score_raw;
    }

    for row in semantic {
        let score_vector = row.score_vector().unwrap_or(0.0);
        let entry = by_id
            .entry(row.document().id().to_string())
            .or_insert_with(|| Entry::new(row.document().clone()));
        entry.score_vector = score_vector;
    }

    // `n_vec` is kept alongside each result purely as a tie-break key — the
    // `FusedResult::score_vector` field holds the raw cosine similarity, not
    // this per-query-normalized quantity.
    let mut scored: Vec<(FusedResult, f32)> = by_id
        .into_values()
        .filter(|entry| query.passes_domain_filters(entry.document.domain()))
        .map(|entry| {
            let n_lex = if max_lex > 0.0 { entry.score_raw / max_lex } else { 0.0 };
            let n_vec = if max_vec > 0.0 { entry.score_vector / max_vec } else { 0.0 };
            let authority = entry.document.authority_score().unwrap_or(0.0);
            let freshness = entry
                .document
                .age_days(now)
                .map(|age| (-age / 30.0).exp() as f32)
                .unwrap_or(0.0);

            let score = weights.w_lexical * n_lex
                + weights.w_vector * n_vec
                + weights.w_authority * authority
                + weights.w_freshness * freshness;

            (FusedResult::new(entry.document, score, entry.score_raw, entry.score_vector, 0), n_vec)
        })
        .collect();

    scored.sort_by(|(a, a_nvec), (b, b_nvec)| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b_nvec.partial_cmp(a_nvec).unwrap_or(Ordering::Equal))
            .then_with(|| b.document().updated_at().cmp(&a.document().updated_at()))
            .then_with(|| a.document().id().cmp(b.document().id()))
    });

    scored.truncate(query.k());

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (r, _))| FusedResult::new(r.document().clone(), r.score(), r.score_raw(), r.score_vector(), i + 1))
        .collect()
}

struct Entry {
    document: Document,
    score_raw: f32,
    score_vector: f32,
}

impl Entry {
    fn new(document: Document) -> Self {
        Self {
            document,
            score_raw: 0.0,
            score_vector: 0.0,
        }
    }
}

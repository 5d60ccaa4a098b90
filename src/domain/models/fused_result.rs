use serde::{Deserialize, Serialize};

use super::Document;

/// A document enriched with its fused ranking position. Scores are only
/// an ordering device — not comparable across queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    document: Document,
    score: f32,
    score_raw: f32,
    score_vector: f32,
    rank: usize,
}

impl FusedResult {
    pub fn new(document: Document, score: f32, score_raw: f32, score_vector: f32, rank: usize) -> Self {
        Self {
            document,
            score,
            score_raw,
            score_vector,
            rank,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn score_raw(&self) -> f32 {
        self.score_raw
    }

    pub fn score_vector(&self) -> f32 {
        self.score_vector
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}

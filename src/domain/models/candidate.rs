use serde::{Deserialize, Serialize};

use super::Document;

/// One channel's raw score for a document. Exactly one of `score_raw` /
/// `score_vector` is populated depending on which branch produced the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRow {
    document: Document,
    score_raw: Option<f32>,
    score_vector: Option<f32>,
}

impl CandidateRow {
    pub fn lexical(document: Document, score_raw: f32) -> Self {
        Self {
            document,
            score_raw: Some(score_raw),
            score_vector: None,
        }
    }

    pub fn semantic(document: Document, score_vector: f32) -> Self {
        Self {
            document,
            score_raw: None,
            score_vector: Some(score_vector.clamp(0.0, 1.0)),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn score_raw(&self) -> Option<f32> {
        self.score_raw
    }

    pub fn score_vector(&self) -> Option<f32> {
        self.score_vector
    }
}

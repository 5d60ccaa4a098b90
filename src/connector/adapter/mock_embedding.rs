use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;

use crate::application::interfaces::EmbeddingClient;
use crate::domain::DomainError;

/// Deterministic, seeded-RNG embedder used where no real model is
/// configured: same text always maps to the same unit-norm vector.
pub struct MockEmbedding {
    dimensions: usize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self { dimensions: 1536 }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut vector: Vec<f32> = (0..self.dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let vector = self.generate(text);
        debug!(dimensions = vector.len(), "generated mock embedding");
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_yields_same_vector() {
        let embedder = MockEmbedding::new();
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn respects_configured_dimensions() {
        let embedder = MockEmbedding::with_dimensions(128);
        let vector = embedder.embed("test").await.unwrap();
        assert_eq!(vector.len(), 128);
    }

    #[tokio::test]
    async fn output_is_unit_normalized() {
        let embedder = MockEmbedding::new();
        let vector = embedder.embed("test").await.unwrap();
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }
}

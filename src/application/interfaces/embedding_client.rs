use async_trait::async_trait;

use crate::domain::DomainError;

/// Opaque embedding function: `text -> unit-norm vector`.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn dimensions(&self) -> usize;
}

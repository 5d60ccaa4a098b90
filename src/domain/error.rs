use thiserror::Error;

/// Error kinds per the retrieval/indexing error taxonomy.
///
/// Retrieval degrades where it can (`EmbeddingUnavailable`,
/// `StoreUnavailable`, `CacheUnavailable`) and only fails outright when no
/// useful ranking can be produced (`RetrievalFailed`, `Timeout`).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("retrieval failed: both lexical and semantic branches errored")]
    RetrievalFailed,

    #[error("indexer partial failure: {0}")]
    IndexerPartialFailure(String),

    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn embedding_unavailable(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn cache_unavailable(msg: impl Into<String>) -> Self {
        Self::CacheUnavailable(msg.into())
    }

    pub fn indexer_partial_failure(msg: impl Into<String>) -> Self {
        Self::IndexerPartialFailure(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_retrieval_failed(&self) -> bool {
        matches!(self, Self::RetrievalFailed)
    }
}

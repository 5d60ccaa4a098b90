mod cache_store;
mod document_store;
mod embedding_client;
mod mirror_adapter;

pub use cache_store::*;
pub use document_store::*;
pub use embedding_client::*;
pub use mirror_adapter::*;

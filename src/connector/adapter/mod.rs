mod duckdb_document_store;
mod http_mirror;
mod memory_cache;
mod mock_embedding;
mod redis_cache;

pub use duckdb_document_store::*;
pub use http_mirror::*;
pub use memory_cache::*;
pub use mock_embedding::*;
pub use redis_cache::*;

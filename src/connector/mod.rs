//! # Connector Layer
//!
//! External integrations implementing the application layer's interfaces:
//! - Document storage (embedded DuckDB, lexical + vector)
//! - Embedding generation (mock for now, extensible for real models)
//! - Caching (in-memory, Redis)
//! - Mirror indexing (HTTP fan-out to external search engines)

pub mod adapter;

pub use adapter::*;

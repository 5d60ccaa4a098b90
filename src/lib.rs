//! # Hybrid Search Engine
//!
//! A hybrid lexical + semantic document search engine: fuses full-text and
//! vector retrieval into a single localized, ranked result set, with query
//! caching and offline gold-query evaluation.
//!
//! ## Architecture
//!
//! The crate is organized following Domain-Driven Design principles:
//!
//! - `domain`: core models (`Document`, `NormalizedQuery`, `FusedResult`, ...)
//!   and the error taxonomy — independent of any storage or network library.
//! - `application`: use cases (Normalizer, Retriever, Fusion Ranker, Indexer,
//!   Evaluator) and the capability interfaces (`DocumentStore`, `CacheStore`,
//!   `EmbeddingClient`, `MirrorAdapter`) they depend on.
//! - `connector`: adapters implementing those interfaces (embedded DuckDB,
//!   mock embedder, in-memory/Redis cache, HTTP mirror fan-out).

pub mod application;
pub mod connector;
pub mod domain;

pub use application::*;
pub use connector::*;
pub use domain::*;

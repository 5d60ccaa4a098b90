//! # Domain Layer
//!
//! Core business models and error types. This layer is independent of
//! external frameworks and infrastructure — no DuckDB, no reqwest, no tokio
//! beyond `Send + Sync` bounds on the traits that live in `application`.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;

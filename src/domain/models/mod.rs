mod cache_entry;
mod candidate;
mod config;
mod document;
mod fused_result;
mod gold;
mod query;

pub use cache_entry::*;
pub use candidate::*;
pub use config::*;
pub use document::*;
pub use fused_result::*;
pub use gold::*;
pub use query::*;

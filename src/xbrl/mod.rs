// src/xbrl/mod.rs
pub mod contexts;
pub mod facts;
pub mod models;

// Re-export the extraction entry points for convenience
pub use contexts::ContextExtractor;
pub use facts::FactExtractor;
pub use models::{Fact, FactOrigin, FilingContext};

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod normalize;
pub mod report;
pub mod sentiment;
pub mod store;
pub mod trends;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::AppError;
pub use crate::extract::Article;
pub use crate::sentiment::{label_for, PolarityScore, SentimentAnalyzer, SentimentResult};

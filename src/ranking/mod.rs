//! Top-K retrieval over the full catalog.
//!
//! [`Ranker`] drives any [`BatchScorer`](crate::scoring::BatchScorer) across every item
//! in fixed-size batches, optionally on several scoped threads, and keeps the best `k`
//! with a deterministic order.

pub mod error;
pub mod options;
pub mod ranker;
pub mod types;


pub use error::RecommendError;
pub use options::RankOptions;
pub use ranker::Ranker;
pub use types::{Recommendation, ScoredItem};

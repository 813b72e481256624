use serde::{Deserialize, Serialize};

/// A catalog index with its score, as produced by the ranker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    pub item_index: usize,
    pub score: f32,
}

impl ScoredItem {
    pub fn new(item_index: usize, score: f32) -> Self {
        Self { item_index, score }
    }
}

/// One ranked asset returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: String,
    /// Preference score in `(0, 1)`.
    pub score: f32,
    pub display_name: String,
}

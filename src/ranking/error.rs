use thiserror::Error;

use crate::scoring::ScoringError;

/// Errors from a recommendation request.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The user key is not in the trained user map (cold start).
    #[error("user '{user_key}' not found")]
    UserNotFound { user_key: String },

    /// The request deadline passed before the catalog was fully scored.
    #[error("ranking for user '{user_key}' timed out after {scored} of {total} items")]
    Timeout {
        user_key: String,
        scored: usize,
        total: usize,
    },

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

impl RecommendError {
    /// Returns `true` for the cold-start case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecommendError::UserNotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RecommendError::Timeout { .. })
    }
}

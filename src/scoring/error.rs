use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("tensor computation failed: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("layer shape mismatch: {reason}")]
    LayerShape { reason: String },
}

use std::path::PathBuf;
use thiserror::Error;

use crate::names::NameSourceError;
use crate::scoring::ScoringError;

/// A checkpoint could not be turned into a consistent model context.
///
/// Always fatal: the service refuses to serve rather than run with a partial model.
#[derive(Debug, Error)]
pub enum CheckpointLoadError {
    #[error("no checkpoint location configured")]
    NotConfigured,

    #[error("checkpoint file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid checkpoint metadata in {path}: {source}")]
    InvalidMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode weights from {path}: {reason}")]
    Weights { path: PathBuf, reason: String },

    #[error("checkpoint has no tensor named '{name}'")]
    MissingTensor { name: String },

    #[error("tensor '{name}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("invalid model params: {reason}")]
    InvalidParams { reason: String },

    #[error("invalid {map} mapping: {reason}")]
    InvalidIdMap { map: &'static str, reason: String },

    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("inconsistent layer chain: {0}")]
    Scoring(#[from] ScoringError),

    #[error("asset name source failed: {0}")]
    NameSource(#[from] NameSourceError),
}

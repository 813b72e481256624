//! Asset recommender library crate (used by the server and integration tests).
//!
//! Scores every asset in the catalog for a customer with a pretrained NeuMF model
//! (GMF and MLP branches fused into one sigmoid score) and returns the best `k`,
//! each enriched with a display name.
//!
//! # Public API Surface
//!
//! ## Core
//! - [`load_context`], [`recommend`], [`resolve_name`] - load once, query many times
//! - [`ModelContext`], [`ContextHandle`] - the loaded model and its readiness slot
//! - [`Ranker`], [`RankOptions`] - batched, optionally sharded top-K
//!
//! ## Model
//! - [`EmbeddingStore`], [`FusionScorer`], [`Layer`] - the NeuMF forward pass
//! - [`CheckpointSource`], [`DirectoryCheckpointSource`] - pretrained weights
//! - [`AssetNameSource`], [`NameResolver`] - display names
//!
//! ## Serving
//! - [`Config`] - `ASSETREC_*` environment configuration
//! - [`gateway`] - Axum router
//!
//! ## Test/Mock Support
//! Deterministic checkpoints are available in [`testing`] behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod context;
pub mod embedding;
pub mod gateway;
pub mod names;
pub mod ranking;
pub mod scoring;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use checkpoint::{
    Checkpoint, CheckpointLoadError, CheckpointMeta, CheckpointSource, DirectoryCheckpointSource,
    ModelParams,
};
pub use config::{Config, ConfigError};
pub use context::{
    ContextHandle, IdMap, ModelContext, load_context, recommend, recommend_default, resolve_name,
};
pub use embedding::{Branch, EmbeddingStore, select_device};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use names::{
    AssetNameSource, AssetRecord, JsonAssetNameSource, NameOverrides, NameResolver,
    NameSourceError, StaticAssetNames,
};
pub use ranking::{RankOptions, Ranker, RecommendError, Recommendation, ScoredItem};
pub use scoring::{Activation, BatchScorer, FusionScorer, Layer, ScoringError};

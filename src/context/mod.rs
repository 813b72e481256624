//! The loaded model and its readiness.
//!
//! [`ModelContext`] binds the embedding tables, the layer chain, the identifier maps
//! and the name resolver. It is built once from a
//! [`CheckpointSource`](crate::checkpoint::CheckpointSource) and an
//! [`AssetNameSource`](crate::names::AssetNameSource), validated as a whole, and then
//! only read. [`ContextHandle`] gates requests until that single load has finished.

pub mod handle;
pub mod id_map;
pub mod model;


pub use handle::ContextHandle;
pub use id_map::IdMap;
pub use model::ModelContext;

use crate::checkpoint::{CheckpointLoadError, CheckpointSource};
use crate::constants::DEFAULT_TOP_K;
use crate::names::AssetNameSource;
use crate::ranking::{RankOptions, RecommendError, Recommendation};

/// Loads and validates a model context.
pub fn load_context(
    checkpoint: &dyn CheckpointSource,
    names: &dyn AssetNameSource,
) -> Result<ModelContext, CheckpointLoadError> {
    ModelContext::load(checkpoint, names)
}

/// Top-`k` recommendations for `user_key` with default ranking options.
pub fn recommend(
    context: &ModelContext,
    user_key: &str,
    k: usize,
) -> Result<Vec<Recommendation>, RecommendError> {
    context.recommend(user_key, k, &RankOptions::default())
}

/// [`recommend`] with the default `k` of 10.
pub fn recommend_default(
    context: &ModelContext,
    user_key: &str,
) -> Result<Vec<Recommendation>, RecommendError> {
    recommend(context, user_key, DEFAULT_TOP_K)
}

/// Display name for `item_id`.
pub fn resolve_name<'a>(context: &'a ModelContext, item_id: &'a str) -> &'a str {
    context.resolve_name(item_id)
}

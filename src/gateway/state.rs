use std::time::Duration;

use crate::config::Config;
use crate::constants::{DEFAULT_MAX_TOP_K, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TOP_K};
use crate::context::ContextHandle;
use crate::ranking::RankOptions;

#[derive(Debug, Clone)]
pub struct HandlerState {
    /// Empty until the model finishes loading.
    pub context: ContextHandle,

    pub default_top_k: usize,

    pub max_top_k: usize,

    /// Batch size and shard count; the deadline is set per request.
    pub rank_options: RankOptions,

    pub request_timeout: Duration,
}

impl HandlerState {
    pub fn new(context: ContextHandle) -> Self {
        Self {
            context,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
            rank_options: RankOptions::default(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn from_config(context: ContextHandle, config: &Config) -> Self {
        Self {
            context,
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
            rank_options: config.rank_options(),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn top_k_limits(mut self, default_top_k: usize, max_top_k: usize) -> Self {
        self.default_top_k = default_top_k;
        self.max_top_k = max_top_k;
        self
    }

    pub fn rank_options(mut self, rank_options: RankOptions) -> Self {
        self.rank_options = rank_options;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

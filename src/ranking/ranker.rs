use std::cmp::Ordering;
use std::ops::Range;
use std::thread;
use std::time::Instant;

use tracing::debug;

use super::error::RecommendError;
use super::options::RankOptions;
use super::types::ScoredItem;
use crate::constants::DEFAULT_TOP_K;
use crate::context::IdMap;
use crate::scoring::{BatchScorer, ScoringError};

/// Scores a user's whole catalog and keeps the best `k`.
#[derive(Debug)]
pub struct Ranker<'a, S: BatchScorer + ?Sized> {
    users: &'a IdMap,
    scorer: &'a S,
}

impl<'a, S: BatchScorer + ?Sized> Ranker<'a, S> {
    pub fn new(users: &'a IdMap, scorer: &'a S) -> Self {
        Self { users, scorer }
    }

    /// Top-`k` with default options.
    pub fn recommend(&self, user_key: &str, k: usize) -> Result<Vec<ScoredItem>, RecommendError> {
        self.recommend_with(user_key, k, &RankOptions::default())
    }

    /// Top-[`DEFAULT_TOP_K`] with default options.
    pub fn recommend_default(&self, user_key: &str) -> Result<Vec<ScoredItem>, RecommendError> {
        self.recommend(user_key, DEFAULT_TOP_K)
    }

    /// Ranks every catalog item for `user_key`.
    ///
    /// Unknown users fail before any scoring. Output is sorted by descending score,
    /// ties broken by ascending item index, and holds `min(k, catalog_size)` entries.
    pub fn recommend_with(
        &self,
        user_key: &str,
        k: usize,
        options: &RankOptions,
    ) -> Result<Vec<ScoredItem>, RecommendError> {
        let user_index =
            self.users
                .index_of(user_key)
                .ok_or_else(|| RecommendError::UserNotFound {
                    user_key: user_key.to_string(),
                })?;

        let n_items = self.scorer.catalog_size();
        if k == 0 || n_items == 0 {
            return Ok(Vec::new());
        }
        let k = k.min(n_items);

        let started = Instant::now();
        let scores = self.score_catalog(user_key, user_index, n_items, options)?;
        let ranked = select_top_k(scores, k);

        debug!(
            user_index,
            n_items,
            k,
            shards = options.shards,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Ranked catalog"
        );
        Ok(ranked)
    }

    fn score_catalog(
        &self,
        user_key: &str,
        user_index: usize,
        n_items: usize,
        options: &RankOptions,
    ) -> Result<Vec<f32>, RecommendError> {
        let end = u32::try_from(n_items).map_err(|_| ScoringError::InvalidInput {
            reason: format!("catalog of {n_items} items exceeds the u32 index range"),
        })?;

        let shards = options.shards.clamp(1, n_items);
        if shards == 1 {
            return self.score_range(user_key, user_index, 0..end, n_items, options);
        }

        let ranges = shard_ranges(end, shards);
        thread::scope(|scope| {
            let workers: Vec<_> = ranges
                .into_iter()
                .map(|range| {
                    scope.spawn(move || {
                        self.score_range(user_key, user_index, range, n_items, options)
                    })
                })
                .collect();

            let mut scores = Vec::with_capacity(n_items);
            for worker in workers {
                let part = worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
                scores.extend(part);
            }
            Ok(scores)
        })
    }

    fn score_range(
        &self,
        user_key: &str,
        user_index: usize,
        range: Range<u32>,
        n_items: usize,
        options: &RankOptions,
    ) -> Result<Vec<f32>, RecommendError> {
        let batch_size = options.batch_size.max(1);
        let step = u32::try_from(batch_size).unwrap_or(u32::MAX);
        let mut scores = Vec::with_capacity(range.len());
        let mut indices: Vec<u32> = Vec::with_capacity(batch_size.min(range.len()));

        let mut start = range.start;
        while start < range.end {
            if options.expired() {
                return Err(RecommendError::Timeout {
                    user_key: user_key.to_string(),
                    scored: scores.len(),
                    total: n_items,
                });
            }

            let stop = range.end.min(start.saturating_add(step));
            indices.clear();
            indices.extend(start..stop);

            let batch = self.scorer.score_batch(user_index, &indices)?;
            if batch.len() != indices.len() {
                return Err(ScoringError::InvalidInput {
                    reason: format!(
                        "scorer returned {} scores for {} items",
                        batch.len(),
                        indices.len()
                    ),
                }
                .into());
            }
            scores.extend(batch);
            start = stop;
        }

        Ok(scores)
    }
}

/// Splits `0..end` into `shards` contiguous, non-empty ranges in order.
fn shard_ranges(end: u32, shards: usize) -> Vec<Range<u32>> {
    let per_shard = (end as usize).div_ceil(shards) as u32;
    (0..end)
        .step_by(per_shard as usize)
        .map(|start| start..end.min(start + per_shard))
        .collect()
}

/// Descending score, then ascending index. Total, so ranking is reproducible.
fn rank_order(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item_index.cmp(&b.item_index))
}

/// Keeps the `k` best entries of `scores` (index = item index), sorted.
///
/// `k` must be in `1..=scores.len()`.
pub(crate) fn select_top_k(scores: Vec<f32>, k: usize) -> Vec<ScoredItem> {
    let mut items: Vec<ScoredItem> = scores
        .into_iter()
        .enumerate()
        .map(|(item_index, score)| ScoredItem::new(item_index, score))
        .collect();

    if k < items.len() {
        items.select_nth_unstable_by(k - 1, rank_order);
        items.truncate(k);
    }
    items.sort_unstable_by(rank_order);
    items
}

use std::time::{Duration, Instant};

use crate::constants::DEFAULT_SCORING_BATCH_SIZE;

/// Knobs for a single ranking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    /// Items scored per tensor pass.
    pub batch_size: usize,
    /// Worker threads the catalog is split across. `1` scores on the caller's thread.
    pub shards: usize,
    /// Checked between batches; once passed the pass is abandoned.
    pub deadline: Option<Instant>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SCORING_BATCH_SIZE,
            shards: 1,
            deadline: None,
        }
    }
}

impl RankOptions {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the deadline to `timeout` from now.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    pub(crate) fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

use std::collections::{BTreeMap, HashMap};

use crate::checkpoint::CheckpointLoadError;

/// Bijective mapping between opaque string keys and dense indices `0..n`.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    index_of: HashMap<String, usize>,
    keys: Vec<String>,
}

impl IdMap {
    /// Validates that `raw` covers exactly `0..expected_len` with no shared index.
    pub fn from_raw(
        map: &'static str,
        raw: &BTreeMap<String, u64>,
        expected_len: usize,
    ) -> Result<Self, CheckpointLoadError> {
        if raw.len() != expected_len {
            return Err(CheckpointLoadError::InvalidIdMap {
                map,
                reason: format!("{} keys, expected {expected_len}", raw.len()),
            });
        }

        let mut keys: Vec<Option<String>> = vec![None; expected_len];
        for (key, &index) in raw {
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| keys.get_mut(i))
                .ok_or_else(|| CheckpointLoadError::InvalidIdMap {
                    map,
                    reason: format!("key '{key}' has index {index}, outside 0..{expected_len}"),
                })?;

            if let Some(existing) = slot {
                return Err(CheckpointLoadError::InvalidIdMap {
                    map,
                    reason: format!("keys '{existing}' and '{key}' share index {index}"),
                });
            }
            *slot = Some(key.clone());
        }

        // Every slot is filled: len matches and no index was used twice.
        let keys: Vec<String> = keys.into_iter().flatten().collect();
        let index_of = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();

        Ok(Self { index_of, keys })
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_of.get(key).copied()
    }

    pub fn key_of(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index_of.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in index order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use candle_core::Device;
use tracing::{debug, info};

use super::error::CheckpointLoadError;
use super::format::{Checkpoint, CheckpointMeta};
use crate::constants::{CHECKPOINT_META_FILENAME, CHECKPOINT_WEIGHTS_FILENAME};

/// Supplies a pretrained checkpoint.
pub trait CheckpointSource {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Reads the checkpoint, placing its tensors on `device`.
    fn load(&self, device: &Device) -> Result<Checkpoint, CheckpointLoadError>;
}

/// Checkpoint stored as a directory holding `checkpoint.json` and `model.safetensors`.
#[derive(Debug, Clone)]
pub struct DirectoryCheckpointSource {
    dir: PathBuf,
}

impl DirectoryCheckpointSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_META_FILENAME)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_WEIGHTS_FILENAME)
    }

    fn read_meta(&self) -> Result<CheckpointMeta, CheckpointLoadError> {
        let path = self.meta_path();
        let content = fs::read_to_string(&path).map_err(|source| CheckpointLoadError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|source| CheckpointLoadError::InvalidMetadata { path, source })
    }
}

impl CheckpointSource for DirectoryCheckpointSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn load(&self, device: &Device) -> Result<Checkpoint, CheckpointLoadError> {
        let meta_path = self.meta_path();
        let weights_path = self.weights_path();

        for path in [&meta_path, &weights_path] {
            if !path.is_file() {
                return Err(CheckpointLoadError::MissingFile { path: path.clone() });
            }
        }

        let meta = self.read_meta()?;
        debug!(
            path = %meta_path.display(),
            n_users = meta.params.n_users,
            n_items = meta.params.n_items,
            "Read checkpoint metadata"
        );

        let tensors = candle_core::safetensors::load(&weights_path, device).map_err(|e| {
            CheckpointLoadError::Weights {
                path: weights_path.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(
            path = %weights_path.display(),
            tensors = tensors.len(),
            "Checkpoint weights decoded"
        );

        Ok(Checkpoint::new(meta, tensors))
    }
}

/// An in-memory checkpoint is its own source.
impl CheckpointSource for Checkpoint {
    fn describe(&self) -> String {
        "in-memory checkpoint".to_string()
    }

    fn load(&self, device: &Device) -> Result<Checkpoint, CheckpointLoadError> {
        let tensors = self
            .tensors()
            .iter()
            .map(|(name, tensor)| Ok((name.clone(), tensor.to_device(device)?)))
            .collect::<Result<_, CheckpointLoadError>>()?;
        Ok(Checkpoint::new(self.meta().clone(), tensors))
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use candle_core::Tensor;
use serde::{Deserialize, Serialize};

use super::error::CheckpointLoadError;
use crate::constants::{
    CHECKPOINT_META_FILENAME, CHECKPOINT_WEIGHTS_FILENAME, DEFAULT_GMF_DIM, DEFAULT_HIDDEN_LAYERS,
    DEFAULT_MLP_DIM,
};

/// Architecture hyper-parameters recorded by the training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParams {
    pub n_users: usize,
    pub n_items: usize,
    /// GMF embedding width.
    pub eg: usize,
    /// MLP embedding width.
    pub em: usize,
    /// Hidden widths of the MLP tower, in order.
    pub layers: Vec<usize>,
}

impl ModelParams {
    /// Params with the training pipeline's default widths.
    pub fn new(n_users: usize, n_items: usize) -> Self {
        Self {
            n_users,
            n_items,
            eg: DEFAULT_GMF_DIM,
            em: DEFAULT_MLP_DIM,
            layers: DEFAULT_HIDDEN_LAYERS.to_vec(),
        }
    }

    pub fn gmf_dim(mut self, eg: usize) -> Self {
        self.eg = eg;
        self
    }

    pub fn mlp_dim(mut self, em: usize) -> Self {
        self.em = em;
        self
    }

    pub fn hidden_layers(mut self, layers: Vec<usize>) -> Self {
        self.layers = layers;
        self
    }

    /// Width of the last hidden layer (0 when the tower is empty).
    pub fn last_hidden_width(&self) -> usize {
        self.layers.last().copied().unwrap_or(0)
    }

    /// Input width of the `layer`-th hidden stage.
    pub fn layer_input_width(&self, layer: usize) -> usize {
        if layer == 0 {
            2 * self.em
        } else {
            self.layers[layer - 1]
        }
    }

    /// Input width of the fusion layer.
    pub fn fusion_input_width(&self) -> usize {
        self.eg + self.last_hidden_width()
    }
}

/// `checkpoint.json`: params plus the identifier mappings built at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub params: ModelParams,
    pub user2id: BTreeMap<String, u64>,
    pub item2id: BTreeMap<String, u64>,
}

/// A pretrained NeuMF checkpoint as read from its source, not yet validated.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    meta: CheckpointMeta,
    tensors: HashMap<String, Tensor>,
}

impl Checkpoint {
    pub fn new(meta: CheckpointMeta, tensors: HashMap<String, Tensor>) -> Self {
        Self { meta, tensors }
    }

    pub fn meta(&self) -> &CheckpointMeta {
        &self.meta
    }

    pub fn params(&self) -> &ModelParams {
        &self.meta.params
    }

    pub fn tensors(&self) -> &HashMap<String, Tensor> {
        &self.tensors
    }

    /// Looks up a named tensor.
    pub fn tensor(&self, name: &str) -> Result<&Tensor, CheckpointLoadError> {
        self.tensors
            .get(name)
            .ok_or_else(|| CheckpointLoadError::MissingTensor {
                name: name.to_string(),
            })
    }

    /// Replaces (or adds) a tensor.
    pub fn insert_tensor(&mut self, name: impl Into<String>, tensor: Tensor) -> Option<Tensor> {
        self.tensors.insert(name.into(), tensor)
    }

    pub fn remove_tensor(&mut self, name: &str) -> Option<Tensor> {
        self.tensors.remove(name)
    }

    pub fn meta_mut(&mut self) -> &mut CheckpointMeta {
        &mut self.meta
    }

    /// Writes `checkpoint.json` and `model.safetensors` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<(), CheckpointLoadError> {
        fs::create_dir_all(dir).map_err(|source| CheckpointLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let meta_path = dir.join(CHECKPOINT_META_FILENAME);
        let meta = serde_json::to_string_pretty(&self.meta).map_err(|source| {
            CheckpointLoadError::InvalidMetadata {
                path: meta_path.clone(),
                source,
            }
        })?;
        fs::write(&meta_path, meta).map_err(|source| CheckpointLoadError::Io {
            path: meta_path.clone(),
            source,
        })?;

        let weights_path = dir.join(CHECKPOINT_WEIGHTS_FILENAME);
        candle_core::safetensors::save(&self.tensors, &weights_path).map_err(|e| {
            CheckpointLoadError::Weights {
                path: weights_path.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(())
    }
}

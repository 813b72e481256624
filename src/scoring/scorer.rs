use candle_core::{DType, Tensor};
use tracing::trace;

use crate::embedding::{Branch, EmbeddingStore};

use super::error::ScoringError;
use super::layer::{Activation, Layer};

/// Scores a batch of items for one user.
///
/// The ranker is written against this seam so it can drive any scorer; the
/// production implementation is the loaded model context.
pub trait BatchScorer: Sync {
    /// Number of scorable items; valid item indices are `0..catalog_size()`.
    fn catalog_size(&self) -> usize;

    /// Returns one score per entry of `item_indices`, in the same order.
    fn score_batch(&self, user_index: usize, item_indices: &[u32])
    -> Result<Vec<f32>, ScoringError>;
}

/// NeuMF forward pass: GMF interaction + MLP tower, fused into one sigmoid score.
#[derive(Debug, Clone)]
pub struct FusionScorer {
    layers: Vec<Layer>,
    fusion: Layer,
}

impl FusionScorer {
    /// Checks the layer chain against the embedding widths it will be fed.
    ///
    /// The first hidden layer consumes `2 * mlp_dim`, every layer consumes its
    /// predecessor's output, and the fusion layer maps `gmf_dim + last_hidden` to 1.
    pub fn new(
        layers: Vec<Layer>,
        fusion: Layer,
        gmf_dim: usize,
        mlp_dim: usize,
    ) -> Result<Self, ScoringError> {
        let Some(last) = layers.last() else {
            return Err(ScoringError::LayerShape {
                reason: "MLP tower has no hidden layers".to_string(),
            });
        };
        let last_hidden = last.out_dim();

        let mut expected_in = 2 * mlp_dim;
        for (i, layer) in layers.iter().enumerate() {
            if layer.in_dim() != expected_in {
                return Err(ScoringError::LayerShape {
                    reason: format!(
                        "hidden layer {i} expects {} inputs, previous stage yields {expected_in}",
                        layer.in_dim()
                    ),
                });
            }
            expected_in = layer.out_dim();
        }

        if fusion.in_dim() != gmf_dim + last_hidden || fusion.out_dim() != 1 {
            return Err(ScoringError::LayerShape {
                reason: format!(
                    "fusion layer is {}x{}, expected {}x1",
                    fusion.in_dim(),
                    fusion.out_dim(),
                    gmf_dim + last_hidden
                ),
            });
        }

        Ok(Self { layers, fusion })
    }

    /// Hidden layers in application order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn fusion(&self) -> &Layer {
        &self.fusion
    }

    /// Width of the MLP tower's output.
    pub fn last_hidden_width(&self) -> usize {
        self.layers.last().map_or(0, Layer::out_dim)
    }

    /// Scores every item in `item_indices` against `user_index` in one tensor pass.
    ///
    /// The user's embeddings are gathered once and broadcast across the batch.
    pub fn score_batch(
        &self,
        store: &EmbeddingStore,
        user_index: usize,
        item_indices: &[u32],
    ) -> Result<Vec<f32>, ScoringError> {
        if item_indices.is_empty() {
            return Ok(Vec::new());
        }

        let batch = item_indices.len();
        let items = Tensor::from_slice(item_indices, batch, store.device())?;

        let user_gmf = store.row(Branch::UserGmf, user_index)?;
        let item_gmf = store.rows(Branch::ItemGmf, &items)?;
        let gmf = item_gmf.broadcast_mul(&user_gmf)?;

        let user_mlp = store
            .row(Branch::UserMlp, user_index)?
            .broadcast_as((batch, store.mlp_dim()))?
            .contiguous()?;
        let item_mlp = store.rows(Branch::ItemMlp, &items)?;
        let mut hidden = Tensor::cat(&[&user_mlp, &item_mlp], 1)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden)?;
        }

        let fused = Tensor::cat(&[&gmf, &hidden], 1)?;
        let scores = self
            .fusion
            .forward(&fused)?
            .squeeze(1)?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()?;

        trace!(user_index, batch, "Scored batch");
        Ok(scores)
    }

    /// Scores a single user/item pair.
    pub fn score_pair(
        &self,
        store: &EmbeddingStore,
        user_index: usize,
        item_index: usize,
    ) -> Result<f32, ScoringError> {
        let item = u32::try_from(item_index).map_err(|_| ScoringError::InvalidInput {
            reason: format!("item index {item_index} does not fit in u32"),
        })?;
        let scores = self.score_batch(store, user_index, &[item])?;
        scores
            .first()
            .copied()
            .ok_or_else(|| ScoringError::InvalidInput {
                reason: "empty score batch".to_string(),
            })
    }
}

/// Builds the hidden-layer list of a tower: every stage is linear + ReLU.
pub fn relu_tower(
    stages: impl IntoIterator<Item = (Tensor, Tensor)>,
) -> Result<Vec<Layer>, ScoringError> {
    stages
        .into_iter()
        .map(|(weight, bias)| Layer::new(weight, bias, Activation::Relu))
        .collect()
}

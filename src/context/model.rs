use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use tracing::{debug, info};

use super::id_map::IdMap;
use crate::checkpoint::{
    Checkpoint, CheckpointLoadError, CheckpointSource, DirectoryCheckpointSource, ModelParams,
};
use crate::config::Config;
use crate::constants::{FUSION_BIAS_TENSOR, FUSION_WEIGHT_TENSOR, mlp_bias_name, mlp_weight_name};
use crate::embedding::{Branch, EmbeddingStore, select_device};
use crate::names::{
    AssetNameSource, AssetRecord, JsonAssetNameSource, NameOverrides, NameResolver,
    StaticAssetNames,
};
use crate::ranking::{RankOptions, Ranker, RecommendError, Recommendation, ScoredItem};
use crate::scoring::{Activation, BatchScorer, FusionScorer, Layer, ScoringError, relu_tower};

/// Everything a recommendation request reads, loaded and validated once.
///
/// Immutable after construction; share it behind an `Arc` across request handlers.
#[derive(Debug)]
pub struct ModelContext {
    params: ModelParams,
    users: IdMap,
    items: IdMap,
    store: EmbeddingStore,
    scorer: FusionScorer,
    names: NameResolver,
}

impl ModelContext {
    /// Loads a checkpoint and asset names on the default device.
    pub fn load(
        checkpoint: &dyn CheckpointSource,
        names: &dyn AssetNameSource,
    ) -> Result<Self, CheckpointLoadError> {
        Self::load_with(
            checkpoint,
            names,
            &NameOverrides::default(),
            &select_device(),
        )
    }

    /// Loads with explicit name overrides and device.
    pub fn load_with(
        checkpoint: &dyn CheckpointSource,
        names: &dyn AssetNameSource,
        overrides: &NameOverrides,
        device: &Device,
    ) -> Result<Self, CheckpointLoadError> {
        let started = Instant::now();
        info!(
            checkpoint = %checkpoint.describe(),
            names = %names.describe(),
            ?device,
            "Loading model context"
        );

        let loaded = checkpoint.load(device)?;
        let records = names.asset_records()?;
        let context = Self::from_checkpoint(loaded, records, overrides)?;

        info!(
            n_users = context.params.n_users,
            n_items = context.params.n_items,
            eg = context.params.eg,
            em = context.params.em,
            layers = ?context.params.layers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model context ready"
        );

        Ok(context)
    }

    /// Builds the sources named by `config` and loads from them.
    pub fn from_config(config: &Config) -> Result<Self, CheckpointLoadError> {
        let dir = config
            .checkpoint_path
            .as_ref()
            .ok_or(CheckpointLoadError::NotConfigured)?;
        let checkpoint = DirectoryCheckpointSource::new(dir.clone());

        let overrides = match &config.name_overrides_path {
            Some(path) => NameOverrides::from_json_file(path)?,
            None => NameOverrides::default(),
        };

        let device = select_device();
        match &config.assets_path {
            Some(path) => Self::load_with(
                &checkpoint,
                &JsonAssetNameSource::new(path.clone()),
                &overrides,
                &device,
            ),
            None => Self::load_with(&checkpoint, &StaticAssetNames::empty(), &overrides, &device),
        }
    }

    /// Validates a checkpoint and assembles the context.
    ///
    /// Every table, hidden layer and the fusion layer is checked against the declared
    /// params before anything is built; the first mismatch aborts the load.
    pub fn from_checkpoint(
        checkpoint: Checkpoint,
        records: Vec<AssetRecord>,
        overrides: &NameOverrides,
    ) -> Result<Self, CheckpointLoadError> {
        let params = checkpoint.params().clone();
        validate_params(&params)?;

        let users = IdMap::from_raw("user2id", &checkpoint.meta().user2id, params.n_users)?;
        let items = IdMap::from_raw("item2id", &checkpoint.meta().item2id, params.n_items)?;

        let table = |branch: Branch| {
            let rows = if branch.is_user() {
                params.n_users
            } else {
                params.n_items
            };
            let dim = if branch.is_gmf() { params.eg } else { params.em };
            checked_tensor(&checkpoint, branch.tensor_name(), &[rows, dim])
        };
        let store = EmbeddingStore::new(
            table(Branch::UserGmf)?,
            table(Branch::ItemGmf)?,
            table(Branch::UserMlp)?,
            table(Branch::ItemMlp)?,
        )?;

        let stages = params
            .layers
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let weight = checked_tensor(
                    &checkpoint,
                    &mlp_weight_name(i),
                    &[width, params.layer_input_width(i)],
                )?;
                let bias = checked_tensor(&checkpoint, &mlp_bias_name(i), &[width])?;
                Ok((weight, bias))
            })
            .collect::<Result<Vec<_>, CheckpointLoadError>>()?;
        let layers = relu_tower(stages)?;

        let fusion = Layer::new(
            checked_tensor(
                &checkpoint,
                FUSION_WEIGHT_TENSOR,
                &[1, params.fusion_input_width()],
            )?,
            checked_tensor(&checkpoint, FUSION_BIAS_TENSOR, &[1])?,
            Activation::Sigmoid,
        )?;
        let scorer = FusionScorer::new(layers, fusion, params.eg, params.em)?;

        let expected_tensors = 4 + 2 * params.layers.len() + 2;
        if checkpoint.tensors().len() > expected_tensors {
            debug!(
                unused = checkpoint.tensors().len() - expected_tensors,
                "Checkpoint carries tensors the scorer does not use"
            );
        }

        let names = NameResolver::build(items.keys(), records, overrides);

        Ok(Self {
            params,
            users,
            items,
            store,
            scorer,
            names,
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn users(&self) -> &IdMap {
        &self.users
    }

    pub fn items(&self) -> &IdMap {
        &self.items
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn scorer(&self) -> &FusionScorer {
        &self.scorer
    }

    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    pub fn n_users(&self) -> usize {
        self.params.n_users
    }

    pub fn n_items(&self) -> usize {
        self.params.n_items
    }

    /// Ranker over this context's catalog.
    pub fn ranker(&self) -> Ranker<'_, Self> {
        Ranker::new(&self.users, self)
    }

    /// Top-`k` items for `user_key`, enriched with ids and display names.
    pub fn recommend(
        &self,
        user_key: &str,
        k: usize,
        options: &RankOptions,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let ranked = self.ranker().recommend_with(user_key, k, options)?;
        Ok(self.enrich(ranked))
    }

    /// Attaches item ids and display names to ranked indices.
    pub fn enrich(&self, ranked: Vec<ScoredItem>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .filter_map(|scored| {
                let item_id = self.items.key_of(scored.item_index)?;
                Some(Recommendation {
                    item_id: item_id.to_string(),
                    score: scored.score,
                    display_name: self.names.resolve(item_id).to_string(),
                })
            })
            .collect()
    }

    /// Display name for an item id (the id itself when nothing better is known).
    pub fn resolve_name<'a>(&'a self, item_id: &'a str) -> &'a str {
        self.names.resolve(item_id)
    }
}

impl BatchScorer for ModelContext {
    fn catalog_size(&self) -> usize {
        self.params.n_items
    }

    fn score_batch(
        &self,
        user_index: usize,
        item_indices: &[u32],
    ) -> Result<Vec<f32>, ScoringError> {
        self.scorer.score_batch(&self.store, user_index, item_indices)
    }
}

fn validate_params(params: &ModelParams) -> Result<(), CheckpointLoadError> {
    if params.eg == 0 || params.em == 0 {
        return Err(CheckpointLoadError::InvalidParams {
            reason: format!(
                "embedding widths must be positive (eg={}, em={})",
                params.eg, params.em
            ),
        });
    }
    if params.layers.is_empty() {
        return Err(CheckpointLoadError::InvalidParams {
            reason: "layers must name at least one hidden width".to_string(),
        });
    }
    if let Some(i) = params.layers.iter().position(|&w| w == 0) {
        return Err(CheckpointLoadError::InvalidParams {
            reason: format!("hidden layer {i} has width 0"),
        });
    }
    if u32::try_from(params.n_items).is_err() {
        return Err(CheckpointLoadError::InvalidParams {
            reason: format!("n_items {} exceeds the u32 index range", params.n_items),
        });
    }
    Ok(())
}

/// Fetches `name`, checks its shape, and converts it to f32.
fn checked_tensor(
    checkpoint: &Checkpoint,
    name: &str,
    expected: &[usize],
) -> Result<Tensor, CheckpointLoadError> {
    let tensor = checkpoint.tensor(name)?;
    if tensor.dims() != expected {
        return Err(CheckpointLoadError::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: tensor.dims().to_vec(),
        });
    }
    Ok(tensor.to_dtype(DType::F32)?)
}

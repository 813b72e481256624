//! Deterministic checkpoints and asset records for tests and benchmarks.
//!
//! Available under `cfg(test)` and the `mock` feature.

use std::collections::{BTreeMap, HashMap};

use candle_core::{Device, Result, Tensor};

use crate::checkpoint::{Checkpoint, CheckpointMeta, ModelParams};
use crate::constants::{FUSION_BIAS_TENSOR, FUSION_WEIGHT_TENSOR, mlp_bias_name, mlp_weight_name};
use crate::embedding::Branch;
use crate::names::AssetRecord;

/// Key of the `i`-th fixture user.
pub fn user_key(i: usize) -> String {
    format!("user-{i}")
}

/// ISIN-shaped key of the `i`-th fixture item.
pub fn item_key(i: usize) -> String {
    format!("XS{i:010}")
}

/// Builds a checkpoint with pseudo-random weights for arbitrary params.
///
/// Same params and seed give bit-identical tensors.
#[derive(Debug, Clone)]
pub struct CheckpointBuilder {
    params: ModelParams,
    seed: u64,
}

impl CheckpointBuilder {
    pub fn new(params: ModelParams) -> Self {
        Self { params, seed: 7 }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self) -> Result<Checkpoint> {
        let p = &self.params;
        let mut rng = SplitMix64(self.seed);
        let mut tensors = HashMap::new();

        for branch in Branch::ALL {
            let rows = if branch.is_user() { p.n_users } else { p.n_items };
            let dim = if branch.is_gmf() { p.eg } else { p.em };
            tensors.insert(branch.tensor_name().to_string(), rng.tensor(&[rows, dim])?);
        }

        for (i, &width) in p.layers.iter().enumerate() {
            tensors.insert(
                mlp_weight_name(i),
                rng.tensor(&[width, p.layer_input_width(i)])?,
            );
            tensors.insert(mlp_bias_name(i), rng.tensor(&[width])?);
        }

        tensors.insert(
            FUSION_WEIGHT_TENSOR.to_string(),
            rng.tensor(&[1, p.fusion_input_width()])?,
        );
        tensors.insert(FUSION_BIAS_TENSOR.to_string(), rng.tensor(&[1])?);

        Ok(Checkpoint::new(id_maps(p.clone()), tensors))
    }
}

/// Metadata with `user_key(i)` / `item_key(i)` mapped to `i`.
pub fn id_maps(params: ModelParams) -> CheckpointMeta {
    let user2id: BTreeMap<String, u64> =
        (0..params.n_users).map(|i| (user_key(i), i as u64)).collect();
    let item2id: BTreeMap<String, u64> =
        (0..params.n_items).map(|i| (item_key(i), i as u64)).collect();
    CheckpointMeta {
        params,
        user2id,
        item2id,
    }
}

/// One user, three items scoring exactly `[0.9, 0.3, 0.9]`.
///
/// Items 0 and 2 share identical embeddings, so their scores tie bit for bit.
/// Top-2 must be `[item 0, item 2]`.
pub fn tie_checkpoint() -> Result<Checkpoint> {
    let params = ModelParams::new(1, 3)
        .gmf_dim(1)
        .mlp_dim(1)
        .hidden_layers(vec![1]);
    let device = Device::Cpu;
    let high = 9f32.ln();
    let low = (3f32 / 7.0).ln();

    let mut tensors = HashMap::new();
    let mut put = |name: &str, tensor: Tensor| {
        tensors.insert(name.to_string(), tensor);
    };
    put(
        Branch::UserGmf.tensor_name(),
        Tensor::new(&[[1f32]], &device)?,
    );
    put(
        Branch::ItemGmf.tensor_name(),
        Tensor::new(&[[high], [low], [high]], &device)?,
    );
    put(
        Branch::UserMlp.tensor_name(),
        Tensor::new(&[[0f32]], &device)?,
    );
    put(
        Branch::ItemMlp.tensor_name(),
        Tensor::new(&[[0f32], [0.0], [0.0]], &device)?,
    );
    put(&mlp_weight_name(0), Tensor::new(&[[0f32, 0.0]], &device)?);
    put(&mlp_bias_name(0), Tensor::new(&[0f32], &device)?);
    put(FUSION_WEIGHT_TENSOR, Tensor::new(&[[1f32, 0.0]], &device)?);
    put(FUSION_BIAS_TENSOR, Tensor::new(&[0f32], &device)?);

    Ok(Checkpoint::new(id_maps(params), tensors))
}

/// Records for items `0..n` cycling through the three naming cases:
/// full name, short name only (empty primary), and no names at all.
pub fn sample_asset_records(n: usize) -> Vec<AssetRecord> {
    (0..n)
        .map(|i| {
            let record = AssetRecord::new(item_key(i));
            match i % 3 {
                0 => record
                    .primary_name(format!("Asset Fund {i}"))
                    .short_name(format!("AF{i}")),
                1 => record.primary_name("").short_name(format!("AF{i}")),
                _ => record,
            }
        })
        .collect()
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[-0.5, 0.5)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32 - 0.5
    }

    fn tensor(&mut self, shape: &[usize]) -> Result<Tensor> {
        let len = shape.iter().product();
        let values: Vec<f32> = (0..len).map(|_| self.next_f32()).collect();
        Tensor::from_vec(values, shape, &Device::Cpu)
    }
}

//! Cross-cutting, shared constants.
//!
//! # Checkpoint Layout
//!
//! Tensor names mirror the module layout of the NeuMF network that produced the
//! checkpoint. The MLP tower is a sequential container where every linear stage is
//! followed by a ReLU, so linear stages sit at the even slots (`mlp.0`, `mlp.2`, ...).
//! Use [`mlp_weight_name`] and [`mlp_bias_name`] instead of formatting slot names by hand.

/// Default number of recommendations returned when the caller does not ask for a `k`.
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on `k` accepted by the HTTP gateway.
pub const DEFAULT_MAX_TOP_K: usize = 100;

/// Items scored per tensor pass.
pub const DEFAULT_SCORING_BATCH_SIZE: usize = 4096;

/// Default per-request deadline for catalog scoring.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// GMF embedding width used by the training pipeline when none is given.
pub const DEFAULT_GMF_DIM: usize = 32;

/// MLP embedding width used by the training pipeline when none is given.
pub const DEFAULT_MLP_DIM: usize = 32;

/// Hidden widths of the MLP tower used by the training pipeline when none are given.
pub const DEFAULT_HIDDEN_LAYERS: [usize; 3] = [128, 64, 32];

/// Metadata file inside a checkpoint directory.
pub const CHECKPOINT_META_FILENAME: &str = "checkpoint.json";

/// Weight file inside a checkpoint directory.
pub const CHECKPOINT_WEIGHTS_FILENAME: &str = "model.safetensors";

pub const USER_GMF_TENSOR: &str = "user_gmf.weight";
pub const ITEM_GMF_TENSOR: &str = "item_gmf.weight";
pub const USER_MLP_TENSOR: &str = "user_mlp.weight";
pub const ITEM_MLP_TENSOR: &str = "item_mlp.weight";
pub const FUSION_WEIGHT_TENSOR: &str = "out.weight";
pub const FUSION_BIAS_TENSOR: &str = "out.bias";

/// Name of the weight tensor of the `layer`-th hidden stage.
pub fn mlp_weight_name(layer: usize) -> String {
    format!("mlp.{}.weight", layer * 2)
}

/// Name of the bias tensor of the `layer`-th hidden stage.
pub fn mlp_bias_name(layer: usize) -> String {
    format!("mlp.{}.bias", layer * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlp_tensor_names_skip_activation_slots() {
        assert_eq!(mlp_weight_name(0), "mlp.0.weight");
        assert_eq!(mlp_bias_name(1), "mlp.2.bias");
        assert_eq!(mlp_weight_name(2), "mlp.4.weight");
    }
}

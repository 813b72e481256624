use candle_core::{Module, Tensor};
use candle_nn::Linear;

use super::error::ScoringError;

/// Non-linearity applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    Relu,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Identity => Ok(xs.clone()),
            Activation::Relu => xs.relu(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(xs),
        }
    }
}

/// `activation(x · Wᵀ + b)` with `W` stored as `[out_dim, in_dim]`.
#[derive(Debug, Clone)]
pub struct Layer {
    linear: Linear,
    bias: Tensor,
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
}

impl Layer {
    /// Builds a layer, rejecting a bias whose length differs from the weight's output rows.
    pub fn new(weight: Tensor, bias: Tensor, activation: Activation) -> Result<Self, ScoringError> {
        let (out_dim, in_dim) = weight.dims2()?;
        let bias_len = bias.dims1()?;
        if bias_len != out_dim {
            return Err(ScoringError::LayerShape {
                reason: format!("bias has {bias_len} entries, weight has {out_dim} output rows"),
            });
        }

        Ok(Self {
            linear: Linear::new(weight, Some(bias.clone())),
            bias,
            in_dim,
            out_dim,
            activation,
        })
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// `[out_dim, in_dim]` weight matrix.
    pub fn weight(&self) -> &Tensor {
        self.linear.weight()
    }

    /// `[out_dim]` bias vector.
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// `[batch, in_dim]` -> `[batch, out_dim]`.
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.activation.apply(&self.linear.forward(xs)?)
    }
}

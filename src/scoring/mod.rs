//! NeuMF scoring.
//!
//! [`FusionScorer`] runs the forward pass for one user against a batch of items:
//!
//! 1. GMF: `user_gmf ⊙ item_gmf`
//! 2. MLP: `concat(user_mlp, item_mlp)` through the hidden [`Layer`]s (linear + ReLU)
//! 3. Fusion: `sigmoid(concat(gmf, mlp) · wᵀ + b)`
//!
//! The user row is broadcast across the batch, so scoring a whole catalog is a
//! handful of tensor ops rather than one call per item. Scoring is pure: the same
//! weights always give the same scores.

pub mod error;
pub mod layer;
pub mod scorer;


pub use error::ScoringError;
pub use layer::{Activation, Layer};
pub use scorer::{BatchScorer, FusionScorer, relu_tower};

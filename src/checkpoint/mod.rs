//! Pretrained checkpoint format and sources.
//!
//! A checkpoint is produced by the (external) training process. It carries the
//! architecture params, the user/item identifier mappings and every weight tensor,
//! named after the NeuMF module layout (see [`crate::constants`]). Nothing here
//! validates shapes; that happens when a [`ModelContext`](crate::context::ModelContext)
//! is built.

pub mod error;
pub mod format;
pub mod source;


pub use error::CheckpointLoadError;
pub use format::{Checkpoint, CheckpointMeta, ModelParams};
pub use source::{CheckpointSource, DirectoryCheckpointSource};

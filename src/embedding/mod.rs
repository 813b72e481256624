//! Embedding tables + compute device.
//!
//! - [`store`] holds the user/item tables of both NeuMF branches.
//! - [`device`] picks CPU / Metal / CUDA for the loaded weights.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Embedding lookup tables.
pub mod store;

pub use device::select_device;
pub use store::{Branch, EmbeddingStore};

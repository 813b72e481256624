//! Asset display names.
//!
//! [`NameResolver`] is built once at load time from an [`AssetNameSource`] and answers
//! lookups without touching the source again.

pub mod error;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::NameSourceError;
pub use resolver::{NameResolver, fallback_name};
pub use source::{
    AssetNameSource, AssetRecord, JsonAssetNameSource, NameOverride, NameOverrides,
    StaticAssetNames,
};

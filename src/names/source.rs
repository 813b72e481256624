use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::NameSourceError;

/// Naming fields of one asset, keyed by its identifier (ISIN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(alias = "isin", alias = "ISIN")]
    pub item_id: String,
    #[serde(default, alias = "asset_name")]
    pub primary_name: Option<String>,
    #[serde(default, alias = "asset_short_name")]
    pub short_name: Option<String>,
}

impl AssetRecord {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            primary_name: None,
            short_name: None,
        }
    }

    pub fn primary_name(mut self, name: impl Into<String>) -> Self {
        self.primary_name = Some(name.into());
        self
    }

    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }
}

/// Supplies per-asset naming fields for name resolution.
pub trait AssetNameSource {
    fn describe(&self) -> String;

    fn asset_records(&self) -> Result<Vec<AssetRecord>, NameSourceError>;
}

/// JSON array of asset records, e.g. an export of the assets table.
///
/// Accepts both `{item_id, primary_name, short_name}` and the column names of the
/// assets table (`{ISIN, asset_name, asset_short_name}`).
#[derive(Debug, Clone)]
pub struct JsonAssetNameSource {
    path: PathBuf,
}

impl JsonAssetNameSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssetNameSource for JsonAssetNameSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn asset_records(&self) -> Result<Vec<AssetRecord>, NameSourceError> {
        read_json(&self.path)
    }
}

/// Fixed in-memory records. An empty set makes every name fall back to its identifier.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetNames {
    records: Vec<AssetRecord>,
}

impl StaticAssetNames {
    pub fn new(records: Vec<AssetRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl AssetNameSource for StaticAssetNames {
    fn describe(&self) -> String {
        format!("{} static asset records", self.records.len())
    }

    fn asset_records(&self) -> Result<Vec<AssetRecord>, NameSourceError> {
        Ok(self.records.clone())
    }
}

/// Curated naming fields for one asset.
///
/// Deserializes from either a bare string (a primary name) or an object with
/// `primary_name`/`asset_name` and `short_name`/`asset_short_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NameOverrideRepr")]
pub struct NameOverride {
    pub primary_name: Option<String>,
    pub short_name: Option<String>,
}

impl NameOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_name(mut self, name: impl Into<String>) -> Self {
        self.primary_name = Some(name.into());
        self
    }

    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    /// Replaces every field this override sets, whatever the record held.
    pub fn apply(&self, mut record: AssetRecord) -> AssetRecord {
        if let Some(name) = &self.primary_name {
            record.primary_name = Some(name.clone());
        }
        if let Some(name) = &self.short_name {
            record.short_name = Some(name.clone());
        }
        record
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameOverrideRepr {
    Primary(String),
    Fields {
        #[serde(default, alias = "asset_name")]
        primary_name: Option<String>,
        #[serde(default, alias = "asset_short_name")]
        short_name: Option<String>,
    },
}

impl From<NameOverrideRepr> for NameOverride {
    fn from(repr: NameOverrideRepr) -> Self {
        match repr {
            NameOverrideRepr::Primary(name) => Self::new().primary_name(name),
            NameOverrideRepr::Fields {
                primary_name,
                short_name,
            } => Self {
                primary_name,
                short_name,
            },
        }
    }
}

/// Per-asset patches for naming fields that are missing or wrong upstream.
///
/// Applied to the asset records before the fallback chain runs: a field set here
/// always replaces the upstream value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameOverrides(HashMap<String, NameOverride>);

impl NameOverrides {
    pub fn new(overrides: HashMap<String, NameOverride>) -> Self {
        Self(overrides)
    }

    /// Reads a JSON object `{item_id: name | {primary_name?, short_name?}}`.
    pub fn from_json_file(path: &Path) -> Result<Self, NameSourceError> {
        read_json(path)
    }

    /// Sets the primary name patch for `item_id`.
    pub fn with_primary_name(mut self, item_id: impl Into<String>, name: impl Into<String>) -> Self {
        let entry = self.0.entry(item_id.into()).or_default();
        entry.primary_name = Some(name.into());
        self
    }

    /// Sets the short name patch for `item_id`.
    pub fn with_short_name(mut self, item_id: impl Into<String>, name: impl Into<String>) -> Self {
        let entry = self.0.entry(item_id.into()).or_default();
        entry.short_name = Some(name.into());
        self
    }

    pub fn get(&self, item_id: &str) -> Option<&NameOverride> {
        self.0.get(item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, NameSourceError> {
    let content = fs::read_to_string(path).map_err(|source| NameSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| NameSourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

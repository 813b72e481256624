use std::collections::HashMap;

use tracing::debug;

use super::source::{AssetRecord, NameOverrides};

/// Item identifier -> display name, computed once for the whole catalog.
///
/// Each name follows the chain primary name -> short name -> identifier, where an
/// absent or empty field counts as missing. Names are returned exactly as supplied.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    names: HashMap<String, String>,
}

impl NameResolver {
    /// Resolves a name for every id in `item_ids`.
    ///
    /// Records for ids outside the catalog are ignored. When several records share an
    /// id the last one wins. Overrides patch the winning record before the chain runs.
    pub fn build<'a, I>(item_ids: I, records: Vec<AssetRecord>, overrides: &NameOverrides) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let total_records = records.len();
        let by_id: HashMap<String, AssetRecord> = records
            .into_iter()
            .map(|record| (record.item_id.clone(), record))
            .collect();

        let mut names = HashMap::new();
        let mut from_identifier = 0usize;

        for item_id in item_ids {
            let upstream = by_id.get(item_id);
            let patched = overrides.get(item_id).map(|patch| {
                patch.apply(
                    upstream
                        .cloned()
                        .unwrap_or_else(|| AssetRecord::new(item_id)),
                )
            });
            let record = patched.as_ref().or(upstream);

            let primary = record.and_then(|r| r.primary_name.as_deref());
            let short = record.and_then(|r| r.short_name.as_deref());

            let name = fallback_name(item_id, primary, short);
            if name == item_id {
                from_identifier += 1;
            }
            names.insert(item_id.to_string(), name.to_string());
        }

        debug!(
            catalog = names.len(),
            records = total_records,
            distinct_records = by_id.len(),
            overrides = overrides.len(),
            from_identifier,
            "Asset names resolved"
        );

        Self { names }
    }

    /// Display name for `item_id`; ids outside the catalog resolve to themselves.
    pub fn resolve<'a>(&'a self, item_id: &'a str) -> &'a str {
        self.names
            .get(item_id)
            .map(String::as_str)
            .unwrap_or(item_id)
    }

    /// Returns `true` if the id was part of the catalog at build time.
    pub fn contains(&self, item_id: &str) -> bool {
        self.names.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `primary` if non-empty, else `short` if non-empty, else the identifier itself.
pub fn fallback_name<'a>(item_id: &'a str, primary: Option<&'a str>, short: Option<&'a str>) -> &'a str {
    non_empty(primary)
        .or_else(|| non_empty(short))
        .unwrap_or(item_id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

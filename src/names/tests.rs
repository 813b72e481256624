use std::io::Write;

use tempfile::NamedTempFile;

use super::*;

fn catalog() -> Vec<&'static str> {
    vec!["US78462F1030", "GRF000394004", "DE000A2TEDB8", "US46090E1038"]
}

fn records() -> Vec<AssetRecord> {
    vec![
        AssetRecord::new("US78462F1030")
            .primary_name("SPDR S&P 500 ETF Trust")
            .short_name("SPY"),
        AssetRecord::new("GRF000394004").short_name("DELEI5Y"),
        AssetRecord::new("DE000A2TEDB8")
            .primary_name("")
            .short_name(""),
    ]
}

#[test]
fn test_primary_name_wins_over_short_name() {
    let resolver = NameResolver::build(catalog(), records(), &NameOverrides::default());
    assert_eq!(resolver.resolve("US78462F1030"), "SPDR S&P 500 ETF Trust");
}

#[test]
fn test_short_name_used_when_primary_missing() {
    let resolver = NameResolver::build(catalog(), records(), &NameOverrides::default());
    assert_eq!(resolver.resolve("GRF000394004"), "DELEI5Y");
}

#[test]
fn test_identifier_used_when_both_names_empty() {
    let resolver = NameResolver::build(catalog(), records(), &NameOverrides::default());
    assert_eq!(resolver.resolve("DE000A2TEDB8"), "DE000A2TEDB8");
}

#[test]
fn test_identifier_used_when_no_record() {
    let resolver = NameResolver::build(catalog(), records(), &NameOverrides::default());
    assert_eq!(resolver.resolve("US46090E1038"), "US46090E1038");
    assert!(resolver.contains("US46090E1038"));
}

#[test]
fn test_unknown_item_resolves_to_itself() {
    let resolver = NameResolver::build(catalog(), records(), &NameOverrides::default());
    assert_eq!(resolver.resolve("XX0000000000"), "XX0000000000");
    assert!(!resolver.contains("XX0000000000"));
}

#[test]
fn test_records_outside_catalog_are_ignored() {
    let resolver = NameResolver::build(
        ["US78462F1030"],
        records(),
        &NameOverrides::default(),
    );
    assert_eq!(resolver.len(), 1);
    assert_eq!(resolver.resolve("GRF000394004"), "GRF000394004");
}

#[test]
fn test_last_duplicate_record_wins() {
    let records = vec![
        AssetRecord::new("US78462F1030").primary_name("Old name"),
        AssetRecord::new("US78462F1030").primary_name("New name"),
    ];
    let resolver = NameResolver::build(["US78462F1030"], records, &NameOverrides::default());
    assert_eq!(resolver.resolve("US78462F1030"), "New name");
}

#[test]
fn test_whitespace_primary_name_is_kept() {
    let records = vec![AssetRecord::new("A").primary_name(" ").short_name("SHORT")];
    let resolver = NameResolver::build(["A"], records, &NameOverrides::default());
    assert_eq!(resolver.resolve("A"), " ");
}

#[test]
fn test_padded_primary_name_is_returned_verbatim() {
    let records = vec![AssetRecord::new("A").primary_name("  Padded Fund  ")];
    let resolver = NameResolver::build(["A"], records, &NameOverrides::default());
    assert_eq!(resolver.resolve("A"), "  Padded Fund  ");
}

#[test]
fn test_override_fills_missing_primary_name() {
    let overrides = NameOverrides::default()
        .with_primary_name("DE000A2TEDB8", "thyssenkrupp AG")
        .with_primary_name("US46090E1038", "Invesco QQQ");

    let resolver = NameResolver::build(catalog(), records(), &overrides);
    assert_eq!(resolver.resolve("DE000A2TEDB8"), "thyssenkrupp AG");
    assert_eq!(resolver.resolve("US46090E1038"), "Invesco QQQ");
}

#[test]
fn test_override_replaces_upstream_primary_name() {
    let records = vec![AssetRecord::new("X").primary_name("Upstream")];
    let overrides = NameOverrides::default().with_primary_name("X", "Curated");

    let resolver = NameResolver::build(["X"], records, &overrides);
    assert_eq!(resolver.resolve("X"), "Curated");
}

#[test]
fn test_short_name_override_applies_when_primary_missing() {
    let records = vec![AssetRecord::new("GRF000394004").short_name("old short")];
    let overrides = NameOverrides::default().with_short_name("GRF000394004", "DELEI5Y");

    let resolver = NameResolver::build(["GRF000394004"], records, &overrides);
    assert_eq!(resolver.resolve("GRF000394004"), "DELEI5Y");
}

#[test]
fn test_short_name_override_keeps_upstream_primary() {
    let overrides = NameOverrides::default().with_short_name("US78462F1030", "SPY US");

    let resolver = NameResolver::build(catalog(), records(), &overrides);
    assert_eq!(resolver.resolve("US78462F1030"), "SPDR S&P 500 ETF Trust");
}

#[test]
fn test_override_patches_record_field_by_field() {
    let patch = NameOverride::new().short_name("S");
    let patched = patch.apply(AssetRecord::new("A").primary_name("P").short_name("old"));

    assert_eq!(patched.primary_name.as_deref(), Some("P"));
    assert_eq!(patched.short_name.as_deref(), Some("S"));
}

#[test]
fn test_fallback_name_chain() {
    assert_eq!(fallback_name("ID", Some("Primary"), Some("Short")), "Primary");
    assert_eq!(fallback_name("ID", Some(""), Some("Short")), "Short");
    assert_eq!(fallback_name("ID", Some(" "), Some("Short")), " ");
    assert_eq!(fallback_name("ID", None, Some("Short")), "Short");
    assert_eq!(fallback_name("ID", Some(""), Some("")), "ID");
    assert_eq!(fallback_name("ID", None, None), "ID");
}

#[test]
fn test_resolution_is_stable_across_builds() {
    let first = NameResolver::build(catalog(), records(), &NameOverrides::default());
    let second = NameResolver::build(catalog(), records(), &NameOverrides::default());
    for id in catalog() {
        assert_eq!(first.resolve(id), second.resolve(id));
    }
}

#[test]
fn test_json_source_accepts_assets_table_columns() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"ISIN": "US78462F1030", "asset_name": "SPDR S&P 500 ETF Trust", "asset_short_name": "SPY"}},
            {{"isin": "GRF000394004", "asset_name": null, "asset_short_name": "DELEI5Y"}},
            {{"item_id": "US46090E1038"}}
        ]"#
    )
    .unwrap();

    let records = JsonAssetNameSource::new(file.path())
        .asset_records()
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].item_id, "US78462F1030");
    assert_eq!(records[0].short_name.as_deref(), Some("SPY"));
    assert_eq!(records[1].primary_name, None);
    assert_eq!(records[2].short_name, None);
}

#[test]
fn test_json_source_reports_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = JsonAssetNameSource::new(file.path())
        .asset_records()
        .unwrap_err();
    assert!(matches!(err, NameSourceError::Parse { .. }));
}

#[test]
fn test_json_source_reports_missing_file() {
    let err = JsonAssetNameSource::new("/nonexistent/assets.json")
        .asset_records()
        .unwrap_err();
    assert!(matches!(err, NameSourceError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/assets.json"));
}

#[test]
fn test_overrides_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "US4642876555": "iShares Russell 2000 ETF",
            "GRF000394004": {{"asset_short_name": "DELEI5Y"}},
            "US78462F1030": {{"primary_name": "SPDR S&P 500 ETF Trust", "short_name": "SPY"}}
        }}"#
    )
    .unwrap();

    let overrides = NameOverrides::from_json_file(file.path()).unwrap();
    assert_eq!(overrides.len(), 3);
    assert_eq!(
        overrides.get("US4642876555"),
        Some(&NameOverride::new().primary_name("iShares Russell 2000 ETF"))
    );
    assert_eq!(
        overrides.get("GRF000394004"),
        Some(&NameOverride::new().short_name("DELEI5Y"))
    );
    assert_eq!(
        overrides.get("US78462F1030").and_then(|o| o.short_name.as_deref()),
        Some("SPY")
    );
}

#[test]
fn test_static_source() {
    let source = StaticAssetNames::new(records());
    assert_eq!(source.asset_records().unwrap().len(), 3);
    assert!(StaticAssetNames::empty().asset_records().unwrap().is_empty());
}

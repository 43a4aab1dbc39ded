//! Build a store on disk, then load it back the way the server does.

use std::sync::Arc;

use floatscope_common::{DepthSample, FloatMetadata, FloatRecord};
use floatscope_store::{FloatCatalog, StoreBuilder, StoreError, VectorStore, DESCRIPTIONS_FILE};
use serde_json::Map;

fn record(platform: &str, date: &str, surface_temp: f64) -> FloatRecord {
    FloatRecord {
        metadata: FloatMetadata {
            platform_number: format!("b'{platform}'"),
            project_name: "ARGO".to_string(),
            pi_name: "PI".to_string(),
            latitude: -20.0,
            longitude: 70.0,
            date: date.to_string(),
            extra: Map::new(),
        },
        profiles: vec![
            DepthSample { depth: 5.0, temperature: surface_temp, salinity: 35.0 },
            DepthSample { depth: 1000.0, temperature: 4.0, salinity: 34.7 },
        ],
    }
}

fn build(dir: &std::path::Path) -> StoreBuilder {
    let builder = StoreBuilder::from_records(vec![
        record("1900001", "20000101000000", 28.0),
        record("1900002", "not-a-date", 27.0),
        record("1900003", "20000201000000", 12.0),
    ])
    .unwrap();
    builder.write(dir, &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
    builder
}

#[test]
fn test_build_then_load_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let builder = build(dir.path());
    assert_eq!(builder.len(), 2);
    assert_eq!(builder.skipped(), 1);

    let store = VectorStore::load(dir.path()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.dim(), 3);

    let hits = store.search(&[0.1, 0.9, 0.0], 3).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].position, 1);
    assert_eq!(hits[0].metadata.platform_number, "1900003");
    assert!(hits[0].description.contains("Platform 1900003 from project ARGO."));
    assert!(hits[0].score < hits[1].score);
}

#[test]
fn test_catalog_loads_without_index() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path());
    std::fs::remove_file(dir.path().join(floatscope_store::INDEX_FILE)).unwrap();

    let catalog = Arc::new(FloatCatalog::load(dir.path()).unwrap());
    assert_eq!(catalog.len(), 2);
    let err = VectorStore::load_with_catalog(dir.path(), catalog).unwrap_err();
    assert!(matches!(err, StoreError::File { .. }));
}

#[test]
fn test_description_count_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path());
    std::fs::write(dir.path().join(DESCRIPTIONS_FILE), r#"["only one"]"#).unwrap();

    let err = VectorStore::load(dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Inconsistent { left_len: 1, right_len: 2, .. }));
}

#[test]
fn test_write_requires_one_embedding_per_profile() {
    let dir = tempfile::tempdir().unwrap();
    let builder = StoreBuilder::from_records(vec![record("1", "20000101000000", 20.0)]).unwrap();
    let err = builder.write(dir.path(), &[]).unwrap_err();
    assert!(matches!(err, StoreError::Inconsistent { .. }));
}

#[test]
fn test_all_records_skipped_is_error() {
    let err = StoreBuilder::from_records(vec![record("1", "garbage", 20.0)]).unwrap_err();
    assert!(matches!(err, StoreError::Empty(_)));
}

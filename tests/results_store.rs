//! Results Store Integration Tests
//!
//! Tests for artifact existence, loading, and corrupt file handling.

use nbrun::{ArtifactError, ResultsStore, IRIS_ARTIFACT};
use serde_pickle::{SerOptions, Value};
use tempfile::TempDir;

type Record = (f64, f64, f64, f64, String);

fn iris_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            (
                4.0 + x / 100.0,
                3.0,
                1.4,
                0.2,
                format!("record-{:03}", i),
            )
        })
        .collect()
}

fn write_pickle(dir: &TempDir, name: &str, records: &[Record]) {
    let bytes = serde_pickle::to_vec(&records, SerOptions::new()).unwrap();
    std::fs::write(dir.path().join(name), bytes).unwrap();
}

#[test]
fn test_exists_tracks_file_presence() {
    let temp = TempDir::new().unwrap();
    let store = ResultsStore::new(temp.path());

    assert!(!store.exists(IRIS_ARTIFACT));

    write_pickle(&temp, IRIS_ARTIFACT, &iris_records(3));
    assert!(store.exists(IRIS_ARTIFACT));
}

#[test]
fn test_exists_with_missing_base_directory() {
    let temp = TempDir::new().unwrap();
    let store = ResultsStore::new(temp.path().join("no-such-dir"));

    assert!(!store.exists(IRIS_ARTIFACT));
    assert!(store.load_optional(IRIS_ARTIFACT).unwrap().is_none());
}

#[test]
fn test_load_decodes_records() {
    let temp = TempDir::new().unwrap();
    write_pickle(&temp, IRIS_ARTIFACT, &iris_records(150));

    let store = ResultsStore::new(temp.path());
    let artifact = store.load(IRIS_ARTIFACT).unwrap();

    assert_eq!(artifact.name, IRIS_ARTIFACT);
    assert_eq!(artifact.path, temp.path().join(IRIS_ARTIFACT));
    assert_eq!(artifact.len(), Some(150));

    let Value::List(items) = &artifact.value else {
        panic!("expected a list, got {:?}", artifact.value);
    };
    assert_eq!(
        items[0],
        Value::Tuple(vec![
            Value::F64(4.0),
            Value::F64(3.0),
            Value::F64(1.4),
            Value::F64(0.2),
            Value::String("record-000".to_string()),
        ])
    );
}

#[test]
fn test_load_is_idempotent() {
    let temp = TempDir::new().unwrap();
    write_pickle(&temp, IRIS_ARTIFACT, &iris_records(20));

    let store = ResultsStore::new(temp.path());
    let first = store.load(IRIS_ARTIFACT).unwrap();
    let second = store.load(IRIS_ARTIFACT).unwrap();

    assert_eq!(first.value, second.value);
    assert_eq!(first.size_bytes, second.size_bytes);
}

#[test]
fn test_load_missing_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = ResultsStore::new(temp.path());

    match store.load(IRIS_ARTIFACT) {
        Err(ArtifactError::NotFound { path }) => {
            assert_eq!(path, temp.path().join(IRIS_ARTIFACT));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_corrupt_file_fails_to_load() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(IRIS_ARTIFACT), b"not a pickle").unwrap();

    let store = ResultsStore::new(temp.path());

    assert!(store.exists(IRIS_ARTIFACT));
    assert!(matches!(
        store.load(IRIS_ARTIFACT),
        Err(ArtifactError::Corrupt { .. })
    ));
    // A corrupt file is not treated as absent
    assert!(matches!(
        store.load_optional(IRIS_ARTIFACT),
        Err(ArtifactError::Corrupt { .. })
    ));
}

#[test]
fn test_empty_file_is_corrupt() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(IRIS_ARTIFACT), b"").unwrap();

    let store = ResultsStore::new(temp.path());
    assert!(matches!(
        store.load(IRIS_ARTIFACT),
        Err(ArtifactError::Corrupt { .. })
    ));
}

#[test]
fn test_load_does_not_modify_file() {
    let temp = TempDir::new().unwrap();
    write_pickle(&temp, IRIS_ARTIFACT, &iris_records(5));
    let path = temp.path().join(IRIS_ARTIFACT);
    let before = std::fs::read(&path).unwrap();

    let store = ResultsStore::new(temp.path());
    store.load(IRIS_ARTIFACT).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

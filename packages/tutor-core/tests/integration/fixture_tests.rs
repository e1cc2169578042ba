//! Fixture lifecycle tests.

use ntest::timeout;
use tempfile::tempdir;

use tutor_core::engine::{EngineErrorKind, QueryInterface, SqliteEngine};
use tutor_core::fixture::{dataset_checksum, row_counts, Fixture, SchemaLoader};
use tutor_core::TutorError;

use super::helpers::loaded_engine;

/// Loading twice leaves the same dataset as loading once
#[timeout(5000)]
#[test]
fn test_load_is_idempotent() {
    let mut engine = loaded_engine();
    let once = dataset_checksum(&engine).unwrap();
    let counts_once = row_counts(&engine).unwrap();

    SchemaLoader::standard().load(&mut engine).unwrap();
    assert_eq!(dataset_checksum(&engine).unwrap(), once);
    assert_eq!(row_counts(&engine).unwrap(), counts_once);

    // a separate connection with a single load agrees
    let fresh = loaded_engine();
    assert_eq!(dataset_checksum(&fresh).unwrap(), once);
}

/// A dangling employee reference fails and commits nothing on a fresh database
#[timeout(5000)]
#[test]
fn test_dangling_reference_commits_nothing() {
    let mut fixture = Fixture::standard();
    fixture.orders[2].employee_id = Some(42);

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let err = SchemaLoader::new(fixture).load(&mut engine).unwrap_err();
    assert!(matches!(err, TutorError::Integrity { ref table, .. } if table == "orders"));
    assert!(err.is_fatal());

    for table in ["employees", "orders", "order_items"] {
        let err = engine
            .query(&format!("SELECT COUNT(*) FROM {table}"), None)
            .unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::Rejected, "{table} should not exist");
    }
}

/// A failed reload leaves the previously loaded dataset intact
#[timeout(5000)]
#[test]
fn test_failed_reload_keeps_previous_dataset() {
    let mut engine = loaded_engine();
    let before = dataset_checksum(&engine).unwrap();

    let mut fixture = Fixture::standard();
    fixture.order_items[0].product_id = 77;
    let err = SchemaLoader::new(fixture).load(&mut engine).unwrap_err();
    assert!(matches!(err, TutorError::Integrity { ref table, .. } if table == "order_items"));

    assert_eq!(dataset_checksum(&engine).unwrap(), before);
}

/// Rejected DDL surfaces as a schema error and rolls back
#[timeout(5000)]
#[test]
fn test_existing_view_blocks_schema() {
    let mut engine = SqliteEngine::open_in_memory().unwrap();
    // a view named like a fixture table makes DROP TABLE fail
    engine
        .execute_batch("CREATE VIEW products AS SELECT 1 AS id")
        .unwrap();

    let err = SchemaLoader::standard().load(&mut engine).unwrap_err();
    match err {
        TutorError::Schema { table, source } => {
            assert_eq!(table, "products");
            assert_eq!(source.kind, EngineErrorKind::Rejected);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.query("SELECT * FROM employees", None).is_err());
}

/// A file database keeps the fixture across connections
#[timeout(5000)]
#[test]
fn test_file_database_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tutor.db");

    let checksum = {
        let mut engine = SqliteEngine::open(&path).unwrap();
        SchemaLoader::standard().load(&mut engine).unwrap();
        dataset_checksum(&engine).unwrap()
    };

    let engine = SqliteEngine::open(&path).unwrap();
    assert_eq!(dataset_checksum(&engine).unwrap(), checksum);
}

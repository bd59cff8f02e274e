//! Tests for RecordStore
//!
//! These tests verify:
//! - Insert / find / delete by primary key
//! - Validation order on insert
//! - Duplicate primary keys
//! - Iteration order and counts

use dunedb::catalog::Catalog;
use dunedb::error::{CatalogError, CommandError, DataError};
use dunedb::model::{FieldDefinition, FieldKind, FieldValue, Record};
use dunedb::store::RecordStore;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Catalog, RecordStore) {
    let mut catalog = Catalog::new();
    catalog
        .define_type(
            "Person",
            vec![
                FieldDefinition::new("name", FieldKind::String),
                FieldDefinition::new("age", FieldKind::Int),
            ],
            0,
        )
        .unwrap();
    catalog
        .define_type(
            "Item",
            vec![
                FieldDefinition::new("price", FieldKind::Float),
                FieldDefinition::new("id", FieldKind::Int),
            ],
            1,
        )
        .unwrap();
    (catalog, RecordStore::new())
}

fn person(name: &str, age: i64) -> Vec<FieldValue> {
    vec![FieldValue::Str(name.to_string()), FieldValue::Int(age)]
}

fn key(name: &str) -> FieldValue {
    FieldValue::Str(name.to_string())
}

// =============================================================================
// Insert / Find Tests
// =============================================================================

#[test]
fn test_insert_then_find() {
    let (catalog, mut store) = setup();

    let stored = store.insert(&catalog, "Person", person("Alice", 30)).unwrap();
    assert_eq!(stored, &Record::new("Person", person("Alice", 30)));

    let found = store.find(&catalog, "Person", &key("Alice")).unwrap();
    assert_eq!(found.to_string(), "Alice 30");
    assert_eq!(store.count("Person"), 1);
}

#[test]
fn test_find_missing_key() {
    let (catalog, store) = setup();
    assert_eq!(
        store.find(&catalog, "Person", &key("Bob")),
        Err(CommandError::Data(DataError::KeyNotFound("Bob".to_string())))
    );
}

#[test]
fn test_unknown_type_reported_first() {
    let (catalog, mut store) = setup();
    let expected = CommandError::Catalog(CatalogError::TypeNotFound("Ghost".to_string()));

    assert_eq!(
        store.insert(&catalog, "Ghost", vec![FieldValue::Int(1)]),
        Err(expected.clone())
    );
    assert_eq!(store.find(&catalog, "Ghost", &FieldValue::Int(1)), Err(expected.clone()));
    assert_eq!(store.delete(&catalog, "Ghost", &FieldValue::Int(1)), Err(expected));
}

#[test]
fn test_insert_validation_order() {
    let (catalog, mut store) = setup();

    // Count before kinds
    assert_eq!(
        store.insert(&catalog, "Person", vec![FieldValue::Int(1)]),
        Err(CommandError::Data(DataError::FieldCountMismatch {
            expected: 2,
            actual: 1
        }))
    );

    // Lowest mismatching index wins
    assert_eq!(
        store.insert(&catalog, "Person", vec![FieldValue::Int(1), FieldValue::Float(2.0)]),
        Err(CommandError::Data(DataError::FieldTypeMismatch {
            index: 0,
            expected: FieldKind::String
        }))
    );
    assert!(store.is_empty());
}

#[test]
fn test_duplicate_primary_key_keeps_original() {
    let (catalog, mut store) = setup();
    store.insert(&catalog, "Person", person("Alice", 30)).unwrap();

    assert_eq!(
        store.insert(&catalog, "Person", person("Alice", 99)),
        Err(CommandError::Data(DataError::DuplicatePrimaryKey(
            "Alice".to_string()
        )))
    );

    let found = store.find(&catalog, "Person", &key("Alice")).unwrap();
    assert_eq!(found.values[1], FieldValue::Int(30));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_non_key_fields_may_repeat() {
    let (catalog, mut store) = setup();
    store
        .insert(&catalog, "Item", vec![FieldValue::Float(9.5), FieldValue::Int(7)])
        .unwrap();
    store
        .insert(&catalog, "Item", vec![FieldValue::Float(9.5), FieldValue::Int(8)])
        .unwrap();

    // key is the second field
    assert_eq!(store.count("Item"), 2);
    assert!(store.find(&catalog, "Item", &FieldValue::Int(8)).is_ok());
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_record() {
    let (catalog, mut store) = setup();
    store.insert(&catalog, "Person", person("Alice", 30)).unwrap();

    let removed = store.delete(&catalog, "Person", &key("Alice")).unwrap();
    assert_eq!(removed.values, person("Alice", 30));
    assert!(store.find(&catalog, "Person", &key("Alice")).is_err());

    // Second delete of the same key
    assert_eq!(
        store.delete(&catalog, "Person", &key("Alice")),
        Err(CommandError::Data(DataError::KeyNotFound("Alice".to_string())))
    );
}

#[test]
fn test_reinsert_after_delete() {
    let (catalog, mut store) = setup();
    store.insert(&catalog, "Person", person("Alice", 30)).unwrap();
    store.delete(&catalog, "Person", &key("Alice")).unwrap();

    store.insert(&catalog, "Person", person("Alice", 31)).unwrap();
    let found = store.find(&catalog, "Person", &key("Alice")).unwrap();
    assert_eq!(found.values[1], FieldValue::Int(31));
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_records_ordered_by_key() {
    let (catalog, mut store) = setup();
    for name in ["Carol", "Alice", "Bob"] {
        store.insert(&catalog, "Person", person(name, 1)).unwrap();
    }

    let names: Vec<String> = store
        .records("Person")
        .map(|r| r.values[0].to_string())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    assert_eq!(store.records("Item").count(), 0);
    assert_eq!(store.iter().count(), 3);
}

#[test]
fn test_restore_validates_like_insert() {
    let (catalog, mut store) = setup();
    store
        .restore(&catalog, Record::new("Person", person("Alice", 30)))
        .unwrap();

    assert!(store
        .restore(&catalog, Record::new("Person", person("Alice", 30)))
        .is_err());
    assert!(store
        .restore(&catalog, Record::new("Ghost", person("Alice", 30)))
        .is_err());
}

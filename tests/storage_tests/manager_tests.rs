//! Tests for StorageManager
//!
//! These tests verify:
//! - Fresh directory setup
//! - Persist → reload round trips
//! - Checkpointing (explicit and threshold-driven)
//! - Replay of a WAL left behind by a crash
//! - Exclusive lock on the data directory
//! - Fatal errors on corrupted state

use std::fs::OpenOptions;
use std::io::Write;

use dunedb::catalog::Catalog;
use dunedb::config::{Config, Limits, WalSyncStrategy};
use dunedb::error::DuneError;
use dunedb::model::{FieldDefinition, FieldKind, FieldValue, Record};
use dunedb::storage::StorageManager;
use dunedb::store::{RecordMutation, RecordStore};
use dunedb::wal::{Operation, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp.path().join("data"))
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build()
}

fn person_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("name", FieldKind::String),
        FieldDefinition::new("age", FieldKind::Int),
    ]
}

fn person(name: &str, age: i64) -> Vec<FieldValue> {
    vec![FieldValue::Str(name.to_string()), FieldValue::Int(age)]
}

fn key(name: &str) -> FieldValue {
    FieldValue::Str(name.to_string())
}

/// Apply and persist: define Person, insert the given names
fn populate(
    manager: &mut StorageManager,
    catalog: &mut Catalog,
    store: &mut RecordStore,
    names: &[&str],
) {
    if !catalog.contains("Person") {
        let person_type = catalog.define_type("Person", person_fields(), 0).unwrap();
        manager.persist_type_creation(person_type).unwrap();
    }
    for (i, name) in names.iter().enumerate() {
        let record = store
            .insert(catalog, "Person", person(name, i as i64))
            .unwrap()
            .clone();
        manager
            .persist_record_mutation("Person", &key(name), &RecordMutation::Put(record))
            .unwrap();
    }
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_load_fresh_directory() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let (manager, catalog, store, report) = StorageManager::load(&config).unwrap();

    assert!(config.data_dir.join("LOCK").exists());
    assert!(manager.wal_path().exists());
    assert!(!manager.snapshot_path().exists());
    assert!(catalog.is_empty());
    assert!(store.is_empty());
    assert!(!report.snapshot_found);
    assert_eq!(report.entries_replayed, 0);
}

#[test]
fn test_invalid_config_rejected() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .checkpoint_threshold(0)
        .build();

    assert!(matches!(
        StorageManager::load(&config),
        Err(DuneError::Config(_))
    ));
}

#[test]
fn test_second_open_is_locked_out() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let first = StorageManager::load(&config).unwrap();
    assert!(matches!(
        StorageManager::load(&config),
        Err(DuneError::DatabaseLocked)
    ));

    drop(first);
    assert!(StorageManager::load(&config).is_ok());
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_reload_replays_wal() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice", "Bob"]);
        assert_eq!(manager.wal_entry_count(), 3);
        // Dropped without checkpoint, as after a crash
    }

    let (manager, catalog, store, report) = StorageManager::load(&config).unwrap();

    assert_eq!(report.entries_replayed, 3);
    assert!(catalog.contains("Person"));
    assert_eq!(store.count("Person"), 2);
    assert_eq!(
        store.find(&catalog, "Person", &key("Bob")).unwrap().values,
        person("Bob", 1)
    );

    // Load folds the replayed WAL into a snapshot
    assert!(manager.snapshot_path().exists());
    assert_eq!(manager.wal_entry_count(), 0);
}

#[test]
fn test_reload_applies_tombstones() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice", "Bob"]);
        store.delete(&catalog, "Person", &key("Alice")).unwrap();
        manager
            .persist_record_mutation("Person", &key("Alice"), &RecordMutation::Tombstone)
            .unwrap();
    }

    let (_manager, catalog, store, _) = StorageManager::load(&config).unwrap();
    assert!(store.find(&catalog, "Person", &key("Alice")).is_err());
    assert!(store.find(&catalog, "Person", &key("Bob")).is_ok());
}

#[test]
fn test_checkpoint_then_more_writes() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice"]);

        let meta = manager.checkpoint(&catalog, &store).unwrap();
        assert_eq!(meta.type_count, 1);
        assert_eq!(meta.record_count, 1);
        assert_eq!(meta.last_lsn, 2);
        assert_eq!(manager.wal_entry_count(), 0);

        populate(&mut manager, &mut catalog, &mut store, &["Bob"]);
        assert_eq!(manager.wal_entry_count(), 1);
    }

    let (_manager, catalog, store, report) = StorageManager::load(&config).unwrap();
    assert!(report.snapshot_found);
    assert_eq!(report.entries_replayed, 1);
    assert_eq!(catalog.len(), 1);
    assert_eq!(store.count("Person"), 2);
}

#[test]
fn test_maybe_checkpoint_honours_threshold() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path().join("data"))
        .checkpoint_threshold(3)
        .build();

    let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();

    populate(&mut manager, &mut catalog, &mut store, &["Alice"]);
    assert!(!manager.needs_checkpoint());
    assert!(!manager.maybe_checkpoint(&catalog, &store).unwrap());

    populate(&mut manager, &mut catalog, &mut store, &["Bob"]);
    assert!(manager.needs_checkpoint());
    assert!(manager.maybe_checkpoint(&catalog, &store).unwrap());
    assert_eq!(manager.wal_entry_count(), 0);
    assert!(manager.snapshot_path().exists());
}

#[test]
fn test_wal_entries_covered_by_snapshot_are_skipped() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    let wal_path = StorageManager::wal_path_in(&config.data_dir);

    // Snapshot covers LSNs 1..=2, but the WAL still holds them, as if the
    // process died between the snapshot rename and the WAL truncate.
    let stale_wal = {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice"]);
        let bytes = std::fs::read(&wal_path).unwrap();
        manager.checkpoint(&catalog, &store).unwrap();
        bytes
    };
    std::fs::write(&wal_path, &stale_wal).unwrap();

    let (_manager, catalog, store, report) = StorageManager::load(&config).unwrap();
    assert_eq!(report.entries_replayed, 0);
    assert_eq!(catalog.len(), 1);
    assert_eq!(store.count("Person"), 1);
}

// =============================================================================
// Damage Tests
// =============================================================================

#[test]
fn test_torn_wal_tail_is_dropped() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    let wal_path = StorageManager::wal_path_in(&config.data_dir);

    {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice"]);
    }
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0x5A; 9]).unwrap();
    drop(file);

    let (_manager, _catalog, store, report) = StorageManager::load(&config).unwrap();
    let recovery = report.wal_recovery.unwrap();
    assert!(recovery.was_truncated);
    assert_eq!(recovery.entries_recovered, 2);
    assert_eq!(store.count("Person"), 1);
}

#[test]
fn test_corrupted_snapshot_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    {
        let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
        populate(&mut manager, &mut catalog, &mut store, &["Alice"]);
        manager.checkpoint(&catalog, &store).unwrap();
    }

    let snapshot_path = StorageManager::snapshot_path_in(&config.data_dir);
    let mut bytes = std::fs::read(&snapshot_path).unwrap();
    bytes[25] ^= 0xFF;
    std::fs::write(&snapshot_path, &bytes).unwrap();

    assert!(matches!(
        StorageManager::load(&config),
        Err(DuneError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_replay_of_invalid_entry_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    std::fs::create_dir_all(&config.data_dir).unwrap();

    // A record for a type that was never defined
    {
        let wal_path = StorageManager::wal_path_in(&config.data_dir);
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer
            .append(Operation::PutRecord(Record::new("Ghost", person("Alice", 1))))
            .unwrap();
    }

    assert!(matches!(
        StorageManager::load(&config),
        Err(DuneError::Replay { lsn: 1, .. })
    ));
}

// =============================================================================
// Read-only Tests
// =============================================================================

#[test]
fn test_read_state_matches_load_without_locking() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let (mut manager, mut catalog, mut store, _) = StorageManager::load(&config).unwrap();
    populate(&mut manager, &mut catalog, &mut store, &["Alice"]);
    manager.checkpoint(&catalog, &store).unwrap();
    populate(&mut manager, &mut catalog, &mut store, &["Bob"]);

    // Works while the directory is locked
    let (read_catalog, read_store) =
        StorageManager::read_state(&config.data_dir, Limits::default()).unwrap();
    assert_eq!(read_catalog, catalog);
    assert_eq!(read_store, store);
}

//! Storage Manager
//!
//! The persistence layer: loads state at startup and durably records every
//! catalog/record mutation.
//!
//! ## Responsibilities
//! - Hold the exclusive lock on the data directory
//! - Load the snapshot and replay the WAL on startup
//! - Append one WAL entry per mutation
//! - Checkpoint (snapshot + WAL truncate) when the WAL grows large

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::{Config, Limits, WalSyncStrategy};
use crate::error::{CommandError, DuneError, Result};
use crate::model::{FieldValue, TypeDef};
use crate::store::{RecordMutation, RecordStore};
use crate::wal::{Operation, RecoveryResult, WalReader, WalRecovery, WalWriter};

use super::{SnapshotBuilder, SnapshotEntry, SnapshotMeta, SnapshotReader};

/// Manages the data directory
///
/// ## Durability
/// Every `persist_*` call appends to the WAL before returning. With
/// `WalSyncStrategy::EveryWrite` the entry is fsynced too, so a command
/// reported as successful survives a crash.
pub struct StorageManager {
    /// Root data directory
    data_dir: PathBuf,

    /// Checkpoint snapshot path
    snapshot_path: PathBuf,

    /// Write-ahead log
    wal: WalWriter,

    /// WAL entry count that triggers a checkpoint
    checkpoint_threshold: usize,

    /// Held for the lifetime of the manager
    _lock_file: File,
}

/// Summary of what `load` found on disk
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Whether a snapshot file existed
    pub snapshot_found: bool,

    /// WAL recovery statistics (None when no WAL existed)
    pub wal_recovery: Option<RecoveryResult>,

    /// WAL entries applied on top of the snapshot
    pub entries_replayed: u64,
}

impl StorageManager {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const SNAPSHOT_FILENAME: &'static str = "catalog.dat";
    const SNAPSHOT_TMP_FILENAME: &'static str = "catalog.dat.tmp";
    const LOCK_FILENAME: &'static str = "LOCK";

    /// Open the data directory and reconstruct Catalog and RecordStore
    ///
    /// On startup:
    /// 1. Create the data directory, take the exclusive lock
    /// 2. Read the snapshot if it exists (absent = empty state)
    /// 3. Recover the WAL, replaying entries newer than the snapshot
    /// 4. Checkpoint if anything was replayed, leaving an empty WAL
    pub fn load(config: &Config) -> Result<(Self, Catalog, RecordStore, LoadReport)> {
        config.validate()?;

        // Step 1: Directory and lock
        fs::create_dir_all(&config.data_dir)?;
        let lock_file = Self::acquire_lock(&config.data_dir)?;

        let snapshot_path = config.data_dir.join(Self::SNAPSHOT_FILENAME);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let mut catalog = Catalog::with_limits(config.limits);
        let mut store = RecordStore::new();

        // Step 2: Snapshot
        let snapshot_found = snapshot_path.exists();
        let snapshot_lsn = if snapshot_found {
            let snapshot = SnapshotReader::open(&snapshot_path)?;
            let last_lsn = snapshot.last_lsn();
            Self::apply_snapshot(&mut catalog, &mut store, snapshot.into_entries())?;
            info!(
                types = catalog.len(),
                records = store.len(),
                last_lsn,
                "loaded snapshot"
            );
            last_lsn
        } else {
            0
        };

        // Step 3: WAL replay
        let mut entries_replayed = 0;
        let wal_recovery = if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;
            for entry in entries.into_iter().filter(|e| e.lsn > snapshot_lsn) {
                Self::replay(&mut catalog, &mut store, entry.operation)
                    .map_err(|source| DuneError::Replay {
                        lsn: entry.lsn,
                        source,
                    })?;
                entries_replayed += 1;
            }
            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                info!(
                    recovered = recovery.entries_recovered,
                    corrupted = recovery.entries_corrupted,
                    replayed = entries_replayed,
                    last_lsn = recovery.last_lsn,
                    "WAL recovery complete"
                );
            }
            Some(recovery)
        } else {
            None
        };

        let mut wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;
        wal.resume_after(snapshot_lsn);

        let mut manager = Self {
            data_dir: config.data_dir.clone(),
            snapshot_path,
            wal,
            checkpoint_threshold: config.checkpoint_threshold,
            _lock_file: lock_file,
        };

        // Step 4: Fold whatever the WAL held into a fresh snapshot
        if manager.wal.entry_count() > 0 {
            manager.checkpoint(&catalog, &store)?;
        }

        let report = LoadReport {
            snapshot_found,
            wal_recovery,
            entries_replayed,
        };
        Ok((manager, catalog, store, report))
    }

    /// Reconstruct state without locking or repairing anything
    ///
    /// Reads the snapshot and the valid WAL prefix; a damaged tail is
    /// ignored rather than truncated. Used by read-only tooling.
    pub fn read_state(data_dir: &Path, limits: Limits) -> Result<(Catalog, RecordStore)> {
        let mut catalog = Catalog::with_limits(limits);
        let mut store = RecordStore::new();

        let snapshot_path = Self::snapshot_path_in(data_dir);
        let mut snapshot_lsn = 0;
        if snapshot_path.exists() {
            let snapshot = SnapshotReader::open(&snapshot_path)?;
            snapshot_lsn = snapshot.last_lsn();
            Self::apply_snapshot(&mut catalog, &mut store, snapshot.into_entries())?;
        }

        let wal_path = Self::wal_path_in(data_dir);
        if wal_path.exists() {
            for entry in WalReader::open(&wal_path)?.entries() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(DuneError::WalCorruption(_)) => break,
                    Err(e) => return Err(e),
                };
                if entry.lsn <= snapshot_lsn {
                    continue;
                }
                Self::replay(&mut catalog, &mut store, entry.operation).map_err(|source| {
                    DuneError::Replay {
                        lsn: entry.lsn,
                        source,
                    }
                })?;
            }
        }

        Ok((catalog, store))
    }

    /// Durably record a new type
    pub fn persist_type_creation(&mut self, type_def: &TypeDef) -> Result<()> {
        let lsn = self.wal.append(Operation::DefineType(type_def.clone()))?;
        debug!(lsn, type_name = type_def.name(), "persisted type");
        Ok(())
    }

    /// Durably record a stored record or a tombstone for `key`
    pub fn persist_record_mutation(
        &mut self,
        type_name: &str,
        key: &FieldValue,
        mutation: &RecordMutation,
    ) -> Result<()> {
        let operation = match mutation {
            RecordMutation::Put(record) => Operation::PutRecord(record.clone()),
            RecordMutation::Tombstone => Operation::DeleteRecord {
                type_name: type_name.to_string(),
                key: key.clone(),
            },
        };
        let lsn = self.wal.append(operation)?;
        debug!(lsn, type_name, %key, "persisted record mutation");
        Ok(())
    }

    /// Whether the WAL has reached the checkpoint threshold
    pub fn needs_checkpoint(&self) -> bool {
        self.wal.entry_count() >= self.checkpoint_threshold
    }

    /// Write a snapshot of the given state and truncate the WAL
    ///
    /// The snapshot is written to a temp file, fsynced, then renamed into
    /// place, so a crash leaves either the old or the new snapshot.
    pub fn checkpoint(&mut self, catalog: &Catalog, store: &RecordStore) -> Result<SnapshotMeta> {
        self.wal.sync()?;
        let last_lsn = self.wal.current_lsn() - 1;

        let tmp_path = self.data_dir.join(Self::SNAPSHOT_TMP_FILENAME);
        let mut builder = SnapshotBuilder::new(&tmp_path, last_lsn)?;
        for type_def in catalog.types() {
            builder.add_type(type_def)?;
        }
        for record in store.iter() {
            builder.add_record(record)?;
        }
        let mut meta = builder.finish()?;

        fs::rename(&tmp_path, &self.snapshot_path)?;
        sync_dir(&self.data_dir)?;
        meta.path = self.snapshot_path.clone();

        self.wal.truncate()?;

        info!(
            types = meta.type_count,
            records = meta.record_count,
            last_lsn,
            bytes = meta.file_size,
            "checkpoint written"
        );
        Ok(meta)
    }

    /// Checkpoint only if the WAL has reached the threshold
    pub fn maybe_checkpoint(&mut self, catalog: &Catalog, store: &RecordStore) -> Result<bool> {
        if !self.needs_checkpoint() {
            return Ok(false);
        }
        self.checkpoint(catalog, store)?;
        Ok(true)
    }

    /// Force any buffered WAL entries to disk
    pub fn sync(&mut self) -> Result<()> {
        self.wal.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn wal_path(&self) -> &Path {
        self.wal.path()
    }

    /// Entries currently in the WAL
    pub fn wal_entry_count(&self) -> usize {
        self.wal.entry_count()
    }

    pub fn sync_strategy(&self) -> WalSyncStrategy {
        self.wal.sync_strategy()
    }

    /// Path of the WAL inside a data directory (for read-only tooling)
    pub fn wal_path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::WAL_FILENAME)
    }

    /// Path of the snapshot inside a data directory (for read-only tooling)
    pub fn snapshot_path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::SNAPSHOT_FILENAME)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn acquire_lock(data_dir: &Path) -> Result<File> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(data_dir.join(Self::LOCK_FILENAME))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(DuneError::DatabaseLocked);
        }
        Ok(lock_file)
    }

    fn apply_snapshot(
        catalog: &mut Catalog,
        store: &mut RecordStore,
        entries: Vec<SnapshotEntry>,
    ) -> Result<()> {
        for entry in entries {
            let outcome = match entry {
                SnapshotEntry::Type(type_def) => catalog
                    .restore(type_def)
                    .map(|_| ())
                    .map_err(CommandError::from),
                SnapshotEntry::Record(record) => store.restore(catalog, record).map(|_| ()),
            };
            outcome.map_err(|e| {
                DuneError::SnapshotCorruption(format!("snapshot entry rejected: {}", e))
            })?;
        }
        Ok(())
    }

    fn replay(
        catalog: &mut Catalog,
        store: &mut RecordStore,
        operation: Operation,
    ) -> std::result::Result<(), CommandError> {
        match operation {
            Operation::DefineType(type_def) => {
                catalog.restore(type_def)?;
            }
            Operation::PutRecord(record) => {
                store.restore(catalog, record)?;
            }
            Operation::DeleteRecord { type_name, key } => {
                store.delete(catalog, &type_name, &key)?;
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

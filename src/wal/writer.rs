//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{DuneError, Result};
use super::{Operation, WalEntry, WalReader};

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN that the next appended entry receives
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries written since the last fsync
    unsynced: usize,
    /// Entries currently in the file
    entry_count: usize,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// Existing entries are scanned so LSNs continue where they left off.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let (next_lsn, entry_count) = if path.exists() {
            let mut reader = WalReader::open(path)?;
            let mut last_lsn = 0;
            let mut count = 0;
            while let Some(entry) = reader.next_entry()? {
                last_lsn = entry.lsn;
                count += 1;
            }
            (last_lsn + 1, count)
        } else {
            (1, 0)
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            unsynced: 0,
            entry_count,
        })
    }

    /// Append an operation to the WAL, returning its LSN
    ///
    /// The entry reaches the OS before this returns; whether it is also
    /// fsynced depends on the sync strategy.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let bytes = WalEntry::new(lsn, operation).serialize()?;

        self.writer
            .write_all(&bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| DuneError::WalWrite(format!("append at LSN {}: {}", lsn, e)))?;

        self.next_lsn += 1;
        self.entry_count += 1;
        self.unsynced += 1;

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if should_sync {
            self.sync()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer
            .get_ref()
            .sync_data()
            .map_err(|e| DuneError::WalWrite(format!("fsync {}: {}", self.path.display(), e)))?;
        self.unsynced = 0;
        Ok(())
    }

    /// Discard all entries (after a checkpoint)
    ///
    /// LSNs keep counting up so a snapshot's `last_lsn` stays comparable
    /// with entries written after it.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;

        self.entry_count = 0;
        self.unsynced = 0;
        Ok(())
    }

    /// Make sure new entries sort after `lsn` (e.g. a snapshot's last LSN)
    pub fn resume_after(&mut self, lsn: u64) {
        self.next_lsn = self.next_lsn.max(lsn + 1);
    }

    /// Get the current LSN (the one the next append will use)
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn sync_strategy(&self) -> WalSyncStrategy {
        self.sync_strategy
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! Configuration for DuneDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{DuneError, Result};

/// Main configuration for a DuneDB run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for persisted state
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── LOCK           (advisory lock)
    ///     ├── wal.log        (write-ahead log)
    ///     └── catalog.dat    (checkpoint snapshot)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// Number of WAL entries that triggers a snapshot checkpoint
    pub checkpoint_threshold: usize,

    // -------------------------------------------------------------------------
    // Schema Configuration
    // -------------------------------------------------------------------------
    /// Size limits applied to types and values
    pub limits: Limits,

    // -------------------------------------------------------------------------
    // Output Configuration
    // -------------------------------------------------------------------------
    /// Operation log (appended across runs)
    pub log_path: PathBuf,

    /// Search results (truncated at the start of each run)
    pub output_path: PathBuf,

    /// Line written to the search output when a lookup misses
    pub not_found_marker: String,

    /// Skip whitespace-only lines instead of logging them as parse failures
    pub skip_blank_lines: bool,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (every reported success is durable)
    EveryWrite,

    /// fsync after N unsynced entries; a crash may lose up to N-1 of them
    EveryNEntries { count: usize },
}

/// Schema and value size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_fields_per_type: usize,
    pub max_type_name_len: usize,
    pub max_field_name_len: usize,
    pub max_string_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_fields_per_type: 10,
            max_type_name_len: 12,
            max_field_name_len: 20,
            max_string_len: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./dune_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            checkpoint_threshold: 1024,
            limits: Limits::default(),
            log_path: PathBuf::from("log.csv"),
            output_path: PathBuf::from("output.txt"),
            not_found_marker: "NOT FOUND".to_string(),
            skip_blank_lines: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_threshold == 0 {
            return Err(DuneError::Config(
                "checkpoint_threshold must be at least 1".to_string(),
            ));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(DuneError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        let limits = &self.limits;
        if limits.max_fields_per_type == 0
            || limits.max_type_name_len == 0
            || limits.max_field_name_len == 0
            || limits.max_string_len == 0
        {
            return Err(DuneError::Config(format!(
                "limits must all be non-zero: {:?}",
                limits
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all persisted state)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the number of WAL entries that triggers a checkpoint
    pub fn checkpoint_threshold(mut self, entries: usize) -> Self {
        self.config.checkpoint_threshold = entries;
        self
    }

    /// Set the schema/value limits
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Set the operation log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the search output path
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Set the search miss marker
    pub fn not_found_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.not_found_marker = marker.into();
        self
    }

    pub fn skip_blank_lines(mut self, skip: bool) -> Self {
        self.config.skip_blank_lines = skip;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

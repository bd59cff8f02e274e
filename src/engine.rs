//! Engine Module
//!
//! The command engine that coordinates all components.
//!
//! ## Responsibilities
//! - Parse each command line and dispatch it to Catalog or RecordStore
//! - Durably persist every successful mutation before the next command
//! - Log exactly one status per processed line, in input order
//! - Keep per-command failures local; only fatal errors end a run

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{CommandError, DataError, Result, SchemaError};
use crate::model::{FieldDefinition, FieldKind, Record};
use crate::output::{Clock, OperationLogger, SearchOutput, SystemClock};
use crate::protocol::{decode_command, Command, FieldSpec, Response};
use crate::storage::{LoadReport, StorageManager};
use crate::store::{RecordMutation, RecordStore};

/// The command engine
///
/// ## Per-command transaction
/// validate → mutate in memory → persist (WAL) → log. Commands never
/// overlap: command N is fully persisted and logged before N+1 is read.
///
/// The engine exclusively owns the Catalog and RecordStore for the run.
pub struct CommandEngine {
    /// Engine configuration
    config: Config,

    /// Type definitions
    catalog: Catalog,

    /// Records by type and primary key
    store: RecordStore,

    /// WAL + snapshot persistence
    storage: StorageManager,

    /// Append-only operation log
    log: OperationLogger,

    /// Search results
    output: SearchOutput,

    /// Timestamp source for the operation log
    clock: Box<dyn Clock>,

    /// What was found on disk at startup
    load_report: LoadReport,
}

/// Counts for one processed command stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines that produced a log entry
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Blank lines skipped without logging
    pub skipped: u64,
}

impl CommandEngine {
    /// Open the engine: load persisted state, open the output files
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, Box::new(SystemClock))
    }

    /// Open with a custom timestamp source
    pub fn open_with_clock(config: Config, clock: Box<dyn Clock>) -> Result<Self> {
        let (storage, catalog, store, load_report) = StorageManager::load(&config)?;
        let log = OperationLogger::open(&config.log_path)?;
        let output = SearchOutput::create(&config.output_path, config.not_found_marker.clone())?;

        info!(
            data_dir = %config.data_dir.display(),
            types = catalog.len(),
            records = store.len(),
            "engine opened"
        );

        Ok(Self {
            config,
            catalog,
            store,
            storage,
            log,
            output,
            clock,
            load_report,
        })
    }

    /// Process every line of a command file
    ///
    /// Failing to open or read the file is fatal.
    pub fn run_file(&mut self, path: &Path) -> Result<RunSummary> {
        let file = File::open(path)?;
        self.run(BufReader::new(file))
    }

    /// Process every line of a command stream, in order
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);

            match self.execute_line(&line)? {
                Some(response) => {
                    summary.processed += 1;
                    if response.is_success() {
                        summary.succeeded += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
                None => summary.skipped += 1,
            }
        }

        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "command stream finished"
        );
        Ok(summary)
    }

    /// Parse, dispatch and log one line
    ///
    /// Returns `None` for a skipped blank line. A parse failure is logged
    /// as a failure like any other per-command error.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<Response>> {
        let line = line.trim();
        if line.is_empty() && self.config.skip_blank_lines {
            return Ok(None);
        }

        let response = match decode_command(line) {
            Ok(command) => self.execute(command)?,
            Err(e) => Response::Failed(e.into()),
        };

        self.log.record(self.clock.now(), line, response.status())?;

        match response.error() {
            Some(error) => debug!(line, %error, "command failed"),
            None => debug!(line, "command succeeded"),
        }
        Ok(Some(response))
    }

    /// Dispatch one parsed command (no operation-log entry)
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        let response = match command {
            Command::CreateType {
                name,
                primary_key_order,
                fields,
            } => self.create_type(&name, primary_key_order, fields)?,
            Command::CreateRecord { type_name, values } => {
                self.create_record(&type_name, &values)?
            }
            Command::SearchRecord { type_name, key } => self.search_record(&type_name, &key)?,
            Command::DeleteRecord { type_name, key } => self.delete_record(&type_name, &key)?,
        };
        Ok(response)
    }

    /// `create type`: `primary_key_order` is 1-based
    pub fn create_type(
        &mut self,
        name: &str,
        primary_key_order: usize,
        fields: Vec<FieldSpec>,
    ) -> Result<Response> {
        let field_count = fields.len();
        let definitions = match resolve_fields(fields) {
            Ok(definitions) => definitions,
            Err(e) => return Ok(Response::Failed(e.into())),
        };
        let Some(primary_key_index) = primary_key_order.checked_sub(1) else {
            return Ok(Response::Failed(
                SchemaError::InvalidPrimaryKeyIndex {
                    order: primary_key_order,
                    field_count,
                }
                .into(),
            ));
        };

        let type_def = match self.catalog.define_type(name, definitions, primary_key_index) {
            Ok(type_def) => type_def,
            Err(e) => return Ok(Response::Failed(e.into())),
        };

        self.storage.persist_type_creation(type_def)?;
        self.storage.maybe_checkpoint(&self.catalog, &self.store)?;
        Ok(Response::Ok)
    }

    /// `create record`: values are parsed against the named type's fields
    pub fn create_record<S: AsRef<str>>(
        &mut self,
        type_name: &str,
        values: &[S],
    ) -> Result<Response> {
        let max_string_len = self.config.limits.max_string_len;
        let type_def = match self.catalog.lookup_type(type_name) {
            Ok(type_def) => type_def,
            Err(e) => return Ok(Response::Failed(e.into())),
        };
        let values = match type_def.parse_values(values, max_string_len) {
            Ok(values) => values,
            Err(e) => return Ok(Response::Failed(e.into())),
        };

        let record = match self.store.insert(&self.catalog, type_name, values) {
            Ok(record) => record,
            Err(e) => return Ok(Response::Failed(e)),
        };

        let key = record.key(type_def).clone();
        let mutation = RecordMutation::Put(record.clone());
        self.storage.persist_record_mutation(type_name, &key, &mutation)?;
        self.storage.maybe_checkpoint(&self.catalog, &self.store)?;
        Ok(Response::Ok)
    }

    /// `search record`: writes the hit or the miss marker to the search output
    pub fn search_record(&mut self, type_name: &str, key: &str) -> Result<Response> {
        let response = match self.find(type_name, key) {
            Ok(record) => {
                self.output.write_found(&record)?;
                Response::Found(record)
            }
            Err(e) => {
                self.output.write_not_found()?;
                Response::Failed(e)
            }
        };
        Ok(response)
    }

    /// `delete record`
    pub fn delete_record(&mut self, type_name: &str, key: &str) -> Result<Response> {
        let max_string_len = self.config.limits.max_string_len;
        let type_def = match self.catalog.lookup_type(type_name) {
            Ok(type_def) => type_def,
            Err(e) => return Ok(Response::Failed(e.into())),
        };
        let Some(key) = type_def.parse_key(key, max_string_len) else {
            return Ok(Response::Failed(key_not_found(key)));
        };

        if let Err(e) = self.store.delete(&self.catalog, type_name, &key) {
            return Ok(Response::Failed(e));
        }

        self.storage
            .persist_record_mutation(type_name, &key, &RecordMutation::Tombstone)?;
        self.storage.maybe_checkpoint(&self.catalog, &self.store)?;
        Ok(Response::Ok)
    }

    /// Checkpoint and release the data directory
    pub fn close(mut self) -> Result<()> {
        if self.storage.wal_entry_count() > 0 {
            self.storage.checkpoint(&self.catalog, &self.store)?;
        }
        self.storage.sync()?;
        info!("engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Operation-log lines written during this run
    pub fn log_entries_written(&self) -> u64 {
        self.log.entries_written()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn find(&self, type_name: &str, key: &str) -> std::result::Result<Record, CommandError> {
        let type_def = self.catalog.lookup_type(type_name)?;
        let key_value = type_def
            .parse_key(key, self.config.limits.max_string_len)
            .ok_or_else(|| key_not_found(key))?;
        self.store
            .find(&self.catalog, type_name, &key_value)
            .cloned()
    }
}

/// Map `create type` field specs onto the recognized-kinds table
fn resolve_fields(fields: Vec<FieldSpec>) -> std::result::Result<Vec<FieldDefinition>, SchemaError> {
    fields
        .into_iter()
        .map(|spec| {
            FieldKind::from_keyword(&spec.kind)
                .map(|kind| FieldDefinition::new(spec.name, kind))
                .ok_or(SchemaError::UnknownFieldKind(spec.kind))
        })
        .collect()
}

fn key_not_found(key: &str) -> CommandError {
    DataError::KeyNotFound(key.to_string()).into()
}

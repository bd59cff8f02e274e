//! Operation log writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::protocol::Status;

/// Append-only audit log, one line per processed command
pub struct OperationLogger {
    path: PathBuf,
    writer: BufWriter<File>,
    entries_written: u64,
}

impl OperationLogger {
    /// Open the log for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            entries_written: 0,
        })
    }

    /// Append `timestamp, operation, status` and flush
    pub fn record(&mut self, timestamp: i64, operation: &str, status: Status) -> Result<()> {
        writeln!(self.writer, "{}, {}, {}", timestamp, operation, status)?;
        self.writer.flush()?;
        self.entries_written += 1;
        Ok(())
    }

    /// Lines appended by this logger (not counting earlier runs)
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

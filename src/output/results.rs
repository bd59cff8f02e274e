//! Search output writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Record;

/// One line per `search record`: the record's values, or the miss marker
pub struct SearchOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    not_found_marker: String,
}

impl SearchOutput {
    /// Create the output file, discarding results from earlier runs
    pub fn create(path: &Path, not_found_marker: impl Into<String>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            not_found_marker: not_found_marker.into(),
        })
    }

    pub fn write_found(&mut self, record: &Record) -> Result<()> {
        writeln!(self.writer, "{}", record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_not_found(&mut self) -> Result<()> {
        writeln!(self.writer, "{}", self.not_found_marker)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

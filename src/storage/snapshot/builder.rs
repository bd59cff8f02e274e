//! Snapshot Builder
//!
//! Streams type definitions and records into a new snapshot file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::{BufMut, BytesMut};

use crate::error::{DuneError, Result};
use crate::model::{Record, TypeDef};

use super::{SnapshotMeta, FOOTER_SIZE, HEADER_SIZE, MAGIC, TAG_RECORD, TAG_TYPE, VERSION};

/// Builder for a snapshot file
///
/// Call `add_type()` for every type before any `add_record()`, then
/// `finish()` to write the footer and fsync.
pub struct SnapshotBuilder {
    path: PathBuf,
    writer: BufWriter<File>,
    last_lsn: u64,
    type_count: u64,
    record_count: u64,
    /// Bytes written to the data block so far
    data_len: u64,
    data_hasher: crc32fast::Hasher,
}

impl SnapshotBuilder {
    /// Create (or overwrite) a snapshot file covering WAL entries up to `last_lsn`
    pub fn new(path: &Path, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);

        // Entry count placeholder, patched in finish()
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?;
        writer.write_all(&last_lsn.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            last_lsn,
            type_count: 0,
            record_count: 0,
            data_len: 0,
            data_hasher: crc32fast::Hasher::new(),
        })
    }

    /// Add a type definition
    pub fn add_type(&mut self, type_def: &TypeDef) -> Result<()> {
        if self.record_count > 0 {
            return Err(DuneError::SnapshotCorruption(format!(
                "type `{}` added after records",
                type_def.name()
            )));
        }
        self.write_entry(TAG_TYPE, &bincode::serialize(type_def)?)?;
        self.type_count += 1;
        Ok(())
    }

    /// Add a record
    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        self.write_entry(TAG_RECORD, &bincode::serialize(record)?)?;
        self.record_count += 1;
        Ok(())
    }

    fn write_entry(&mut self, tag: u8, payload: &[u8]) -> Result<()> {
        let mut frame = BytesMut::with_capacity(5 + payload.len());
        frame.put_u8(tag);
        frame.put_u32_le(payload.len() as u32);
        frame.put_slice(payload);

        self.writer.write_all(&frame)?;
        self.data_hasher.update(&frame);
        self.data_len += frame.len() as u64;
        Ok(())
    }

    /// Finish building: write footer, patch the header count, fsync
    pub fn finish(mut self) -> Result<SnapshotMeta> {
        let data_crc = self.data_hasher.finalize();

        self.writer.write_all(&self.data_len.to_le_bytes())?;
        self.writer.write_all(&data_crc.to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| DuneError::Io(e.into_error()))?;
        let entry_count = self.type_count + self.record_count;
        file.seek(SeekFrom::Start(6))?; // After magic + version
        file.write_all(&entry_count.to_le_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();
        debug_assert_eq!(file_size, HEADER_SIZE as u64 + self.data_len + FOOTER_SIZE as u64);

        Ok(SnapshotMeta {
            path: self.path,
            type_count: self.type_count,
            record_count: self.record_count,
            last_lsn: self.last_lsn,
            file_size,
        })
    }
}

//! Snapshot Reader
//!
//! Validates a snapshot file and decodes its entries.

use std::fs;
use std::path::Path;

use crate::error::{DuneError, Result};

use super::{SnapshotEntry, FOOTER_SIZE, HEADER_SIZE, MAGIC, TAG_RECORD, TAG_TYPE, VERSION};

/// Fully decoded snapshot
#[derive(Debug)]
pub struct SnapshotReader {
    entries: Vec<SnapshotEntry>,
    last_lsn: u64,
}

impl SnapshotReader {
    /// Read and validate a snapshot
    ///
    /// Any structural problem (magic, version, length, checksum, entry count,
    /// type after record) is reported as `SnapshotCorruption`.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;

        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(corrupt(format!(
                "file is {} bytes, smaller than header + footer",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(corrupt(format!(
                "invalid magic: expected DUNE, got {:?}",
                &bytes[0..4]
            )));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(corrupt(format!("unsupported version: {}", version)));
        }

        let entry_count = read_u64(&bytes[6..14]);
        let last_lsn = read_u64(&bytes[14..22]);

        let footer = &bytes[bytes.len() - FOOTER_SIZE..];
        let data_len = read_u64(&footer[0..8]);
        let stored_crc = read_u32(&footer[8..12]);

        let data_end = bytes.len() - FOOTER_SIZE;
        if HEADER_SIZE as u64 + data_len != data_end as u64 {
            return Err(corrupt(format!(
                "data length {} does not match file size {}",
                data_len,
                bytes.len()
            )));
        }

        let data = &bytes[HEADER_SIZE..data_end];
        let actual_crc = crc32fast::hash(data);
        if actual_crc != stored_crc {
            return Err(corrupt(format!(
                "CRC mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, actual_crc
            )));
        }

        let entries = decode_entries(data)?;
        if entries.len() as u64 != entry_count {
            return Err(corrupt(format!(
                "header claims {} entries, found {}",
                entry_count,
                entries.len()
            )));
        }

        Ok(Self { entries, last_lsn })
    }

    /// Highest WAL LSN folded into this snapshot
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SnapshotEntry> {
        self.entries
    }
}

fn decode_entries(data: &[u8]) -> Result<Vec<SnapshotEntry>> {
    let mut entries = Vec::new();
    let mut seen_record = false;
    let mut pos = 0;

    while pos < data.len() {
        if pos + 5 > data.len() {
            return Err(corrupt(format!("truncated entry header at offset {}", pos)));
        }
        let tag = data[pos];
        let len = read_u32(&data[pos + 1..pos + 5]) as usize;
        pos += 5;

        if pos + len > data.len() {
            return Err(corrupt(format!("truncated entry payload at offset {}", pos)));
        }
        let payload = &data[pos..pos + len];
        pos += len;

        let entry = match tag {
            TAG_TYPE if !seen_record => SnapshotEntry::Type(decode(payload, pos)?),
            TAG_TYPE => return Err(corrupt("type definition after records".to_string())),
            TAG_RECORD => {
                seen_record = true;
                SnapshotEntry::Record(decode(payload, pos)?)
            }
            other => return Err(corrupt(format!("unknown entry tag {:#04x}", other))),
        };
        entries.push(entry);
    }

    Ok(entries)
}

fn decode<T: serde::de::DeserializeOwned>(payload: &[u8], end: usize) -> Result<T> {
    bincode::deserialize(payload)
        .map_err(|e| corrupt(format!("undecodable entry ending at offset {}: {}", end, e)))
}

fn corrupt(message: String) -> DuneError {
    DuneError::SnapshotCorruption(message)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

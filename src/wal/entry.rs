//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{DuneError, Result};
use crate::model::{FieldValue, Record, TypeDef};

/// Entry header: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a single payload; anything larger is treated as corruption
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Mutations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// A new type was added to the catalog
    DefineType(TypeDef),

    /// A record was stored
    PutRecord(Record),

    /// A record was deleted (tombstone)
    DeleteRecord { type_name: String, key: FieldValue },
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self {
            lsn,
            operation,
            timestamp: chrono::Utc::now().timestamp_millis().max(0) as u64,
        }
    }

    /// Serialize to the on-disk frame: `[LSN][CRC][Len][payload]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = self.encode_payload()?;
        let crc = frame_crc(self.lsn, &payload);

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        frame.put_u64_le(self.lsn);
        frame.put_u32_le(crc);
        frame.put_u32_le(payload.len() as u32);
        frame.put_slice(&payload);

        Ok(frame.to_vec())
    }

    /// Deserialize one frame, verifying length and checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = Header::parse(bytes)?;
        let end = HEADER_SIZE + header.len as usize;
        if bytes.len() < end {
            return Err(DuneError::WalCorruption(format!(
                "incomplete entry: expected {} bytes, got {}",
                end,
                bytes.len()
            )));
        }
        Self::from_parts(&header, &bytes[HEADER_SIZE..end])
    }

    /// Total frame size in bytes
    pub fn serialized_size(&self) -> Result<usize> {
        Ok(HEADER_SIZE + bincode::serialized_size(&(&self.operation, self.timestamp))? as usize)
    }

    /// Checksum over LSN, length and payload
    pub fn compute_crc(&self) -> Result<u32> {
        Ok(frame_crc(self.lsn, &self.encode_payload()?))
    }

    pub(super) fn from_parts(header: &Header, payload: &[u8]) -> Result<Self> {
        let actual = frame_crc(header.lsn, payload);
        if actual != header.crc {
            return Err(DuneError::WalCorruption(format!(
                "CRC mismatch at LSN {}: stored {:#010x}, computed {:#010x}",
                header.lsn, header.crc, actual
            )));
        }

        let (operation, timestamp): (Operation, u64) = bincode::deserialize(payload)
            .map_err(|e| DuneError::WalCorruption(format!("undecodable payload: {}", e)))?;

        Ok(Self {
            lsn: header.lsn,
            operation,
            timestamp,
        })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&(&self.operation, self.timestamp))?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(DuneError::WalWrite(format!(
                "entry payload of {} bytes exceeds {}",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }
        Ok(payload)
    }
}

/// Decoded entry header
#[derive(Debug, Clone, Copy)]
pub(super) struct Header {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DuneError::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&bytes[0..8]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[8..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        let header = Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        };

        if header.len > MAX_PAYLOAD_SIZE {
            return Err(DuneError::WalCorruption(format!(
                "payload length {} exceeds {}",
                header.len, MAX_PAYLOAD_SIZE
            )));
        }
        Ok(header)
    }
}

fn frame_crc(lsn: u64, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(&(payload.len() as u32).to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}

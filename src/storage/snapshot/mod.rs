//! Snapshot Module
//!
//! Checkpoint file holding the full catalog and record store.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (22 bytes)                                       │
//! │   Magic: "DUNE" (4) | Version: u16 (2) | Count: u64 (8) │
//! │   LastLsn: u64 (8)                                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                   │
//! │   [Tag: u8][Len: u32][bincode payload]                  │
//! │   ... types first (tag 1), then records (tag 2) ...     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (16 bytes)                                       │
//! │   DataLen: u64 (8) | DataCRC: u32 (4) | Padding (4)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `LastLsn` is the highest WAL LSN folded into the snapshot; replay skips
//! WAL entries at or below it.

mod builder;
mod reader;

use std::path::PathBuf;

pub use builder::SnapshotBuilder;
pub use reader::SnapshotReader;

use crate::model::{Record, TypeDef};

// =============================================================================
// Shared Constants (used by builder and reader)
// =============================================================================

/// Magic bytes identifying a DuneDB snapshot file
pub(crate) const MAGIC: &[u8; 4] = b"DUNE";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + EntryCount (8) + LastLsn (8)
pub(crate) const HEADER_SIZE: usize = 22;

/// Footer size: DataLen (8) + DataCRC (4) + Padding (4)
pub(crate) const FOOTER_SIZE: usize = 16;

/// Entry tag for a type definition
pub(crate) const TAG_TYPE: u8 = 1;

/// Entry tag for a record
pub(crate) const TAG_RECORD: u8 = 2;

// =============================================================================
// Snapshot Contents
// =============================================================================

/// One decoded snapshot entry
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEntry {
    Type(TypeDef),
    Record(Record),
}

/// Metadata of a written snapshot
#[derive(Debug, Clone)]
pub struct SnapshotMeta {
    pub path: PathBuf,
    pub type_count: u64,
    pub record_count: u64,
    pub last_lsn: u64,
    pub file_size: u64,
}

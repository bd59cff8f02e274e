//! RecordStore Module
//!
//! In-memory per-type record tables indexed by primary-key value.
//!
//! ## Responsibilities
//! - Insert records after schema validation (count, kinds, key uniqueness)
//! - Exact primary-key lookup and delete
//! - Ordered iteration for snapshot checkpoints
//!
//! ## Data Structure Choice
//! `BTreeMap<type name, BTreeMap<key, Record>>`:
//! - Deterministic iteration order for snapshots
//! - Single owner (the engine), so no interior locking

mod table;

pub use table::RecordStore;

use crate::model::Record;

/// A record-level change handed to the persistence layer
#[derive(Debug, Clone, PartialEq)]
pub enum RecordMutation {
    /// A newly stored record
    Put(Record),

    /// A deleted key
    Tombstone,
}

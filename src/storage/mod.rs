//! Storage Module
//!
//! Persistence layer: snapshot checkpoints plus the WAL.
//!
//! ## Responsibilities
//! - Reconstruct Catalog and RecordStore at startup (snapshot + WAL replay)
//! - Durably record each mutation before the next command runs
//! - Periodically fold the WAL into a fresh snapshot
//!
//! ## Data Directory
//! ```text
//! {data_dir}/
//!   ├── LOCK           advisory exclusive lock
//!   ├── wal.log        mutations since the last checkpoint
//!   └── catalog.dat    checkpoint snapshot
//! ```

mod snapshot;
mod manager;

pub use snapshot::{SnapshotBuilder, SnapshotEntry, SnapshotMeta, SnapshotReader};
pub use manager::{LoadReport, StorageManager};

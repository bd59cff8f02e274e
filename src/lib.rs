//! # DuneDB
//!
//! A minimal flat-file record store driven by command files:
//! - Typed schemas ("types") with a designated primary-key field
//! - Record insert / lookup / delete by primary key
//! - Write-Ahead Logging (WAL) with snapshot checkpoints for durability
//! - Append-only operation log of every processed command
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Command File                             │
//! │                (one command per line)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command Engine                             │
//! │        parse → dispatch → persist → log (per line)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │   Catalog   │ │ RecordStore │ │  Output     │
//!   │  (types)    │ │ (by PK)     │ │ (log/search)│
//!   └──────┬──────┘ └──────┬──────┘ └─────────────┘
//!          └───────┬───────┘
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │   StorageManager            │
//!   │   WAL (append) + Snapshot   │
//!   └─────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod catalog;
pub mod store;
pub mod wal;
pub mod storage;
pub mod output;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CommandError, DuneError, Result};
pub use config::Config;
pub use catalog::Catalog;
pub use store::RecordStore;
pub use engine::{CommandEngine, RunSummary};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of DuneDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! DuneDB Inspector
//!
//! Read-only view of a data directory. Never takes the lock and never
//! repairs the WAL.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dunedb::config::Limits;
use dunedb::error::{CatalogError, DuneError};
use dunedb::storage::StorageManager;
use dunedb::wal::WalRecovery;
use tracing_subscriber::{fmt, EnvFilter};

/// DuneDB Inspector
#[derive(Parser, Debug)]
#[command(name = "dunedb-inspect")]
#[command(about = "Inspect a DuneDB data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./dune_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List defined types
    Types,

    /// List the records of one type, ordered by primary key
    Records {
        /// The type to list
        type_name: String,
    },

    /// Check the WAL for a damaged tail
    VerifyWal,
}

/// Anything that stops an inspection
#[derive(Debug, thiserror::Error)]
enum InspectError {
    #[error(transparent)]
    Storage(#[from] DuneError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), InspectError> {
    match &args.command {
        Commands::Types => {
            let (catalog, store) = StorageManager::read_state(&args.data_dir, Limits::default())?;
            for type_def in catalog.types() {
                let fields: Vec<String> = type_def
                    .fields()
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.kind))
                    .collect();
                println!(
                    "{} [{}] key={} records={}",
                    type_def.name(),
                    fields.join(", "),
                    type_def.primary_key_field().name,
                    store.count(type_def.name())
                );
            }
        }
        Commands::Records { type_name } => {
            let (catalog, store) = StorageManager::read_state(&args.data_dir, Limits::default())?;
            catalog.lookup_type(type_name)?;
            for record in store.records(type_name) {
                println!("{}", record);
            }
        }
        Commands::VerifyWal => {
            let wal_path = StorageManager::wal_path_in(&args.data_dir);
            if !wal_path.exists() {
                println!("no WAL at {}", wal_path.display());
                return Ok(());
            }
            let result = WalRecovery::verify(&wal_path)?;
            println!("entries:   {}", result.entries_recovered);
            println!("last lsn:  {}", result.last_lsn);
            println!("corrupted: {}", result.entries_corrupted);
            println!("damaged tail: {}", if result.was_truncated { "yes" } else { "no" });
        }
    }
    Ok(())
}

//! DuneDB Command Runner
//!
//! Executes a command file against the data directory.

use std::path::PathBuf;

use clap::Parser;
use dunedb::config::WalSyncStrategy;
use dunedb::{CommandEngine, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// DuneDB
#[derive(Parser, Debug)]
#[command(name = "dunedb")]
#[command(about = "Run a command file against a flat-file record store")]
#[command(version)]
struct Args {
    /// Command file, one command per line
    input_file: PathBuf,

    /// Data directory
    #[arg(short, long, default_value = "./dune_data")]
    data_dir: PathBuf,

    /// Operation log (appended)
    #[arg(short, long, default_value = "log.csv")]
    log_file: PathBuf,

    /// Search results (overwritten)
    #[arg(short, long, default_value = "output.txt")]
    output_file: PathBuf,

    /// WAL entries before a snapshot checkpoint
    #[arg(short, long, default_value = "1024")]
    checkpoint_threshold: usize,

    /// fsync the WAL every N entries instead of after every write
    #[arg(long)]
    sync_every: Option<usize>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dunedb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("DuneDB v{}", dunedb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir.display());
    tracing::info!("Input file: {}", args.input_file.display());

    let sync_strategy = match args.sync_every {
        Some(count) => WalSyncStrategy::EveryNEntries { count },
        None => WalSyncStrategy::EveryWrite,
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .log_path(&args.log_file)
        .output_path(&args.output_file)
        .checkpoint_threshold(args.checkpoint_threshold)
        .wal_sync_strategy(sync_strategy)
        .build();

    let mut engine = match CommandEngine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    match engine.run_file(&args.input_file) {
        Ok(summary) => tracing::info!(
            "Processed {} commands ({} succeeded, {} failed)",
            summary.processed,
            summary.succeeded,
            summary.failed
        ),
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}

//! Store maintenance: legacy CSV conversion and snapshot relocation.

use carburantes::{migrate_csv_to_parquet, migrate_store};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "migrate", about = "Snapshot store migrations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every CSV snapshot in a directory to parquet.
    CsvToParquet {
        dir: PathBuf,
        /// Delete each CSV after a successful conversion.
        #[arg(long)]
        delete_csv: bool,
    },
    /// Copy every parquet snapshot to another directory.
    MoveStore {
        source: PathBuf,
        destination: PathBuf,
        /// Delete each source file after a successful copy.
        #[arg(long)]
        delete_source: bool,
        /// Log what would be copied without touching anything.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    match Args::parse().command {
        Command::CsvToParquet { dir, delete_csv } => {
            let converted = migrate_csv_to_parquet(&dir, delete_csv)?;
            info!("Converted {converted} file(s)");
        }
        Command::MoveStore {
            source,
            destination,
            delete_source,
            dry_run,
        } => {
            let copied = migrate_store(&source, &destination, delete_source, dry_run)?;
            info!("Copied {copied} file(s)");
        }
    }
    Ok(())
}

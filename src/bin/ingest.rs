//! One-shot ingestion job: fetch the feed and write a snapshot, or append
//! the rows to the partitioned table.

use carburantes::{Config, FeedClient, Ingestor, QualityWriter, SnapshotStore};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "ingest", about = "Fetch Spanish fuel prices into the local store")]
struct Args {
    /// Append to the partitioned table instead of writing a snapshot file.
    #[arg(long)]
    table_append: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::from_env()?;

    let http = reqwest::Client::new();
    let feed = FeedClient::new(http, config.feed_url.clone());
    let store = SnapshotStore::open(config.snapshot_dir()).await?;
    let quality = QualityWriter::new(config.metrics_dir());
    let ingestor = Ingestor::new(feed, store, quality);

    if args.table_append {
        let written = ingestor.run_table_append(&config.table_dir()).await?;
        info!("Appended {written} partition file(s) under {}", config.table_dir().display());
    } else {
        let path = ingestor.run_snapshot_ingestion().await?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

//! Dashboard web service: loads the latest snapshot, keeps it fresh in the
//! background, and serves the query API.

use carburantes::{Carburantes, CarburantesError, Config};
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Serve the fuel-price dashboard API")]
struct Args {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::from_env()?;
    let port = args.port.unwrap_or(config.port);

    let client = Arc::new(Carburantes::new(&config).await?);
    match client.refresh().await {
        Ok(()) => info!("Initial snapshot loaded"),
        // Serve anyway; the refresh loop picks the snapshot up once the
        // ingestion job has produced one.
        Err(CarburantesError::NoSnapshot) => {
            error!("No snapshot in the store yet; queries return 503 until one lands")
        }
        Err(e) => return Err(e.into()),
    }

    let refresher = Arc::clone(&client);
    tokio::spawn(refresher.run_refresh_loop(Duration::from_secs(config.cache_ttl_seconds)));

    carburantes::serve(client, &config.host, port).await?;
    Ok(())
}

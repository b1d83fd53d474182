//! Feed fetching and ingestion jobs.
//!
//! Two jobs share the same fetch + normalize front half:
//! [`Ingestor::run_snapshot_ingestion`] writes one snapshot file per run into
//! a [`SnapshotStore`], [`Ingestor::run_table_append`] appends the same rows
//! as `date=<d>/hour=<h>/part-*.parquet` partitions of a long-lived table.
//! Both record data-quality metrics; a metrics failure never fails the run.

use crate::ingest::error::IngestError;
use crate::ingest::feed::{map_feed, RawFeed};
use crate::quality::QualityWriter;
use crate::store::snapshot_store::SnapshotStore;
use crate::types::station::FuelPriceRecord;
use chrono::{DateTime, Utc};
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

pub const SNAPSHOT_TABLE: &str = "spain-fuel-price";
pub const APPEND_TABLE: &str = "spain-fuel-price-table";

/// HTTP client for the minetur fuel-price feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        FeedClient {
            http,
            url: url.into(),
        }
    }

    /// Downloads and decodes the full feed document.
    pub async fn fetch(&self) -> Result<RawFeed, IngestError> {
        info!("Fetching fuel price feed from {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IngestError::NetworkRequest(self.url.clone(), e))?;
        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|source| IngestError::HttpStatus {
                url: self.url.clone(),
                status,
                source,
            })?;
        let feed: RawFeed = response
            .json()
            .await
            .map_err(|e| IngestError::FeedDecode(self.url.clone(), e))?;
        if feed.resultado != "OK" {
            warn!("Feed returned ResultadoConsulta={}", feed.resultado);
        }
        Ok(feed)
    }
}

/// Builds the 28-column snapshot frame from normalized records.
///
/// `timestamp` and `date` are stored as strings (RFC 3339 and `%Y-%m-%d`) so
/// the parquet schema stays plain and the files stay trivially scannable.
pub fn records_to_dataframe(records: &[FuelPriceRecord]) -> Result<DataFrame, IngestError> {
    let df = df!(
        "timestamp" => records.iter().map(|r| r.timestamp.to_rfc3339()).collect::<Vec<_>>(),
        "date" => records.iter().map(|r| r.date.to_string()).collect::<Vec<_>>(),
        "hour" => records.iter().map(|r| r.hour).collect::<Vec<_>>(),
        "zip_code" => records.iter().map(|r| r.zip_code.as_str()).collect::<Vec<_>>(),
        "municipality_id" => records.iter().map(|r| r.municipality_id.as_str()).collect::<Vec<_>>(),
        "province_id" => records.iter().map(|r| r.province_id.as_str()).collect::<Vec<_>>(),
        "sale_type" => records.iter().map(|r| r.sale_type.as_str()).collect::<Vec<_>>(),
        "label" => records.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
        "address" => records.iter().map(|r| r.address.as_str()).collect::<Vec<_>>(),
        "municipality" => records.iter().map(|r| r.municipality.as_str()).collect::<Vec<_>>(),
        "province" => records.iter().map(|r| r.province.as_str()).collect::<Vec<_>>(),
        "locality" => records.iter().map(|r| r.locality.as_str()).collect::<Vec<_>>(),
        "latitude" => records.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => records.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "biodiesel_price" => records.iter().map(|r| r.biodiesel_price).collect::<Vec<_>>(),
        "bioethanol_price" => records.iter().map(|r| r.bioethanol_price).collect::<Vec<_>>(),
        "compressed_natural_gas_price" => records.iter().map(|r| r.compressed_natural_gas_price).collect::<Vec<_>>(),
        "liquefied_natural_gas_price" => records.iter().map(|r| r.liquefied_natural_gas_price).collect::<Vec<_>>(),
        "liquefied_petroleum_gases_price" => records.iter().map(|r| r.liquefied_petroleum_gases_price).collect::<Vec<_>>(),
        "diesel_a_price" => records.iter().map(|r| r.diesel_a_price).collect::<Vec<_>>(),
        "diesel_b_price" => records.iter().map(|r| r.diesel_b_price).collect::<Vec<_>>(),
        "diesel_premium_price" => records.iter().map(|r| r.diesel_premium_price).collect::<Vec<_>>(),
        "gasoline_95_e10_price" => records.iter().map(|r| r.gasoline_95_e10_price).collect::<Vec<_>>(),
        "gasoline_95_e5_price" => records.iter().map(|r| r.gasoline_95_e5_price).collect::<Vec<_>>(),
        "gasoline_95_e5_premium_price" => records.iter().map(|r| r.gasoline_95_e5_premium_price).collect::<Vec<_>>(),
        "gasoline_98_e10_price" => records.iter().map(|r| r.gasoline_98_e10_price).collect::<Vec<_>>(),
        "gasoline_98_e5_price" => records.iter().map(|r| r.gasoline_98_e5_price).collect::<Vec<_>>(),
        "hydrogen_price" => records.iter().map(|r| r.hydrogen_price).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// Appends `df` as Hive-style `date=<d>/hour=<h>` partitions under
/// `table_dir`. Returns the number of part files written.
pub async fn write_table_partitions(
    df: DataFrame,
    table_dir: &Path,
    timestamp: DateTime<Utc>,
) -> Result<usize, IngestError> {
    let table_dir = table_dir.to_path_buf();
    let written = task::spawn_blocking(move || {
        let partitions = df.partition_by(["date", "hour"], true)?;
        let part_name = format!("part-{}.parquet", timestamp.format("%Y%m%dT%H%M%S"));
        let mut written = 0;
        for mut partition in partitions {
            let Some(date) = partition.column("date")?.str()?.get(0).map(String::from) else {
                continue;
            };
            let Some(hour) = partition.column("hour")?.i32()?.get(0) else {
                continue;
            };
            let partition_dir = table_dir.join(format!("date={date}")).join(format!("hour={hour}"));
            std::fs::create_dir_all(&partition_dir)
                .map_err(|e| IngestError::PartitionDirCreation(partition_dir.clone(), e))?;
            let path = partition_dir.join(&part_name);
            let file = std::fs::File::create(&path)
                .map_err(|e| IngestError::PartitionWrite(path.clone(), PolarsError::from(e)))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut partition)
                .map_err(|e| IngestError::PartitionWrite(path.clone(), e))?;
            info!("Wrote partition {}", path.display());
            written += 1;
        }
        Ok::<usize, IngestError>(written)
    })
    .await??;
    Ok(written)
}

/// Runs the two ingestion jobs against one feed endpoint.
pub struct Ingestor {
    feed: FeedClient,
    store: SnapshotStore,
    quality: QualityWriter,
}

impl Ingestor {
    pub fn new(feed: FeedClient, store: SnapshotStore, quality: QualityWriter) -> Self {
        Ingestor {
            feed,
            store,
            quality,
        }
    }

    async fn fetch_frame(&self) -> Result<(DataFrame, DateTime<Utc>), IngestError> {
        let feed = self.feed.fetch().await?;
        let records = map_feed(&feed)?;
        let timestamp = records[0].timestamp;
        let df = records_to_dataframe(&records)?;
        info!("Built frame with {} station rows for {}", df.height(), timestamp);
        Ok((df, timestamp))
    }

    /// Fetches the feed and writes one snapshot file named after the feed
    /// timestamp. Returns the written path.
    pub async fn run_snapshot_ingestion(&self) -> Result<PathBuf, IngestError> {
        let (df, timestamp) = self.fetch_frame().await?;
        self.quality.record(SNAPSHOT_TABLE, &df).await;
        let path = self.store.write_snapshot(df, timestamp).await?;
        Ok(path)
    }

    /// Fetches the feed and appends its rows to the partitioned table under
    /// `table_dir`. Returns the number of part files written.
    pub async fn run_table_append(&self, table_dir: &Path) -> Result<usize, IngestError> {
        let (df, timestamp) = self.fetch_frame().await?;
        self.quality.record(APPEND_TABLE, &df).await;
        write_table_partitions(df, table_dir, timestamp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::{map_feed, RawFeed};

    fn sample_frame() -> (DataFrame, DateTime<Utc>) {
        let json = r#"{
            "Fecha": "15/01/2025 07:00:00",
            "ResultadoConsulta": "OK",
            "ListaEESSPrecio": [
                {
                    "C.P.": "28001",
                    "Rótulo": "REPSOL",
                    "Provincia": "MADRID",
                    "Latitud": "40,416800",
                    "Longitud (WGS84)": "-3,703800",
                    "Precio Gasoleo A": "1,459"
                },
                {
                    "C.P.": "08001",
                    "Rótulo": "CEPSA",
                    "Provincia": "BARCELONA",
                    "Latitud": "41,385000",
                    "Longitud (WGS84)": "2,173400",
                    "Precio Gasoleo A": "1,512"
                }
            ]
        }"#;
        let feed: RawFeed = serde_json::from_str(json).unwrap();
        let records = map_feed(&feed).unwrap();
        let ts = records[0].timestamp;
        (records_to_dataframe(&records).unwrap(), ts)
    }

    #[test]
    fn frame_has_snapshot_schema() {
        let (df, _) = sample_frame();
        assert_eq!(df.width(), 28);
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("timestamp").unwrap().str().unwrap().get(0),
            Some("2025-01-15T06:00:00+00:00")
        );
        assert_eq!(
            df.column("date").unwrap().str().unwrap().get(0),
            Some("2025-01-15")
        );
        assert_eq!(df.column("hour").unwrap().i32().unwrap().get(0), Some(6));
        assert_eq!(
            df.column("diesel_a_price").unwrap().f64().unwrap().get(1),
            Some(1.512)
        );
        // Fuels the feed never mentioned stay fully null.
        assert_eq!(df.column("hydrogen_price").unwrap().null_count(), 2);
    }

    #[test]
    fn empty_records_build_an_empty_frame() {
        let df = records_to_dataframe(&[]).unwrap();
        assert_eq!(df.width(), 28);
        assert_eq!(df.height(), 0);
    }

    #[tokio::test]
    async fn table_append_writes_hive_partitions() {
        let tmp = tempfile::tempdir().unwrap();
        let (df, ts) = sample_frame();

        let written = write_table_partitions(df, tmp.path(), ts).await.unwrap();
        assert_eq!(written, 1);

        let part_dir = tmp.path().join("date=2025-01-15").join("hour=6");
        let parts: Vec<_> = std::fs::read_dir(&part_dir).unwrap().collect();
        assert_eq!(parts.len(), 1);

        let read = LazyFrame::scan_parquet(parts[0].as_ref().unwrap().path(), Default::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(read.height(), 2);
    }

    #[tokio::test]
    async fn repeated_appends_add_part_files() {
        let tmp = tempfile::tempdir().unwrap();
        let (df, ts) = sample_frame();
        write_table_partitions(df.clone(), tmp.path(), ts).await.unwrap();
        // A later run for the same feed hour lands next to the first part.
        let later = ts + chrono::Duration::minutes(30);
        write_table_partitions(df, tmp.path(), later).await.unwrap();

        let part_dir = tmp.path().join("date=2025-01-15").join("hour=6");
        assert_eq!(std::fs::read_dir(&part_dir).unwrap().count(), 2);
    }
}

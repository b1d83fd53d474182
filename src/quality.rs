//! Data-quality metrics for ingested frames.
//!
//! Every ingestion run records one `RowNumber` metric for the whole frame
//! and one `Completeness` metric (non-null fraction) per column. Metrics are
//! appended as parquet part files under `<base>/<table>/`, one file per run.
//! A metrics write failure is logged and swallowed: quality collection must
//! never fail the ingestion that produced the data.

use chrono::Utc;
use log::{error, info};
use polars::prelude::*;
use std::path::PathBuf;
use tokio::task;

/// One quality observation.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityMetric {
    pub processing_time: String,
    pub event_time: Option<String>,
    pub entity: String,
    pub instance: String,
    pub metric_name: String,
    pub value: f64,
}

/// Computes the metric rows for a frame: frame size plus per-column
/// completeness.
pub fn collect_metrics(df: &DataFrame) -> Vec<QualityMetric> {
    let total_rows = df.height() as f64;
    info!("Collecting quality metrics over {} rows", df.height());
    let processing_time = Utc::now().to_rfc3339();
    let event_time = df
        .column("timestamp")
        .ok()
        .and_then(|c| c.str().ok())
        .and_then(|s| s.get(0))
        .map(String::from);

    let mut metrics = vec![QualityMetric {
        processing_time: processing_time.clone(),
        event_time: event_time.clone(),
        entity: "DataFrame".to_string(),
        instance: "size".to_string(),
        metric_name: "RowNumber".to_string(),
        value: total_rows,
    }];

    let divisor = if total_rows > 0.0 { total_rows } else { 1.0 };
    for column in df.get_columns() {
        let non_null = (df.height() - column.null_count()) as f64;
        metrics.push(QualityMetric {
            processing_time: processing_time.clone(),
            event_time: event_time.clone(),
            entity: "Column".to_string(),
            instance: column.name().to_string(),
            metric_name: "Completeness".to_string(),
            value: non_null / divisor,
        });
    }
    metrics
}

/// Turns metric rows into the quality table schema.
pub fn metrics_to_frame(metrics: &[QualityMetric]) -> PolarsResult<DataFrame> {
    df!(
        "processing_time" => metrics.iter().map(|m| m.processing_time.as_str()).collect::<Vec<_>>(),
        "event_time" => metrics.iter().map(|m| m.event_time.clone()).collect::<Vec<_>>(),
        "entity" => metrics.iter().map(|m| m.entity.as_str()).collect::<Vec<_>>(),
        "instance" => metrics.iter().map(|m| m.instance.as_str()).collect::<Vec<_>>(),
        "metric_name" => metrics.iter().map(|m| m.metric_name.as_str()).collect::<Vec<_>>(),
        "value" => metrics.iter().map(|m| m.value).collect::<Vec<_>>(),
    )
}

/// Appends quality metrics under a base directory, one table per subdir.
#[derive(Debug, Clone)]
pub struct QualityWriter {
    base_dir: PathBuf,
}

impl QualityWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        QualityWriter {
            base_dir: base_dir.into(),
        }
    }

    fn append(&self, table: &str, metrics: &[QualityMetric]) -> PolarsResult<()> {
        let table_dir = self.base_dir.join(table);
        std::fs::create_dir_all(&table_dir).map_err(PolarsError::from)?;
        let part = table_dir.join(format!(
            "part-{}.parquet",
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        ));
        let mut frame = metrics_to_frame(metrics)?;
        let file = std::fs::File::create(&part).map_err(PolarsError::from)?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut frame)?;
        info!("Wrote {} quality metrics to {}", metrics.len(), part.display());
        Ok(())
    }

    /// Collects metrics for `df` and appends them on a blocking task, off
    /// the async runtime. Failures are logged, never propagated.
    pub async fn record(&self, table: &str, df: &DataFrame) {
        let metrics = collect_metrics(df);
        let writer = self.clone();
        let owned_table = table.to_string();
        match task::spawn_blocking(move || writer.append(&owned_table, &metrics)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(
                "Failed to write quality metrics for `{}` under {}: {e}",
                table,
                self.base_dir.display()
            ),
            Err(e) => error!("Quality metrics write for `{table}` panicked: {e}"),
        }
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.base_dir.join(table)
    }
}

use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create store directory '{0}'")]
    StoreDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to list store directory '{0}'")]
    StoreDirRead(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing parquet snapshot '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing parquet snapshot '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet snapshot '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Failed to read CSV snapshot '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to copy snapshot '{src}' to '{dst}'")]
    SnapshotCopy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete snapshot '{0}'")]
    SnapshotDelete(PathBuf, #[source] std::io::Error),

    #[error("Failed to combine snapshot frames")]
    FrameConcat(#[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Feed request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode feed JSON from {0}")]
    FeedDecode(String, #[source] reqwest::Error),

    #[error("Failed to parse feed timestamp '{value}'")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Feed timestamp '{0}' does not exist in Europe/Madrid")]
    AmbiguousTimestamp(String),

    #[error("The feed returned no station records")]
    EmptyFeed,

    #[error("Failed to build the snapshot DataFrame")]
    FrameBuild(#[from] PolarsError),

    #[error("Failed to write table partition '{0}'")]
    PartitionWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to create table partition directory '{0}'")]
    PartitionDirCreation(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] crate::store::error::StoreError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

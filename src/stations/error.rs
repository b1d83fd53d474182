use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationIndexError {
    #[error("Failed to read snapshot columns while building the station index")]
    Frame(#[from] PolarsError),
}

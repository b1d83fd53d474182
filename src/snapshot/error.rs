use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Snapshot query failed")]
    Frame(#[from] PolarsError),
}

use crate::config::ConfigError;
use crate::geocoding::GeocodingError;
use crate::ingest::error::IngestError;
use crate::snapshot::error::QueryError;
use crate::stations::error::StationIndexError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarburantesError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Index(#[from] StationIndexError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("No location found for address '{address}'")]
    AddressNotFound { address: String },

    #[error("No snapshot loaded yet; run the ingestion job first")]
    NoSnapshot,

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

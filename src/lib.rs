mod carburantes;
mod config;
mod error;
mod geocoding;
mod ingest;
mod quality;
mod ranking;
mod server;
mod snapshot;
mod stations;
mod store;
mod types;
mod view;

pub use carburantes::{Carburantes, LatLon};
pub use config::{Config, ConfigError};
pub use error::CarburantesError;

pub use geocoding::{GeoPoint, Geocoder, GeocodingError, DEFAULT_NOMINATIM_URL};

pub use ingest::error::IngestError;
pub use ingest::feed::{map_feed, parse_feed_timestamp, RawFeed, RawStationRecord};
pub use ingest::ingestor::{
    records_to_dataframe, write_table_partitions, FeedClient, Ingestor, APPEND_TABLE,
    SNAPSHOT_TABLE,
};

pub use quality::{collect_metrics, metrics_to_frame, QualityMetric, QualityWriter};
pub use ranking::{best_stations, stations_by_distance, RankWeights};

pub use server::routes::{router, ApiError};
pub use server::{serve, ServerError};

pub use snapshot::error::QueryError;
pub use snapshot::frame::SnapshotLazyFrame;

pub use stations::error::StationIndexError;
pub use stations::station_index::{distance_km, IndexedStation, StationIndex};

pub use store::error::StoreError;
pub use store::migrate::{migrate_csv_to_parquet, migrate_store};
pub use store::snapshot_store::{snapshot_file_name, DateWindow, SnapshotStore};

pub use types::fuel::FuelType;
pub use types::station::{FuelPriceRecord, StationPrice, TrendPeriod, TrendPoint, ZoneStats};

pub use view::{
    format_delta, format_distance, format_price, station_summary, trend_kpis, zone_kpis,
    StationSummary, TrendKpis, ZoneKpis,
};

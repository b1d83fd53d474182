//! The `Carburantes` client facade.
//!
//! Holds the snapshot store, the in-memory state built from the latest
//! snapshot (collected frame + spatial index), and the geocoder. Query
//! methods use a builder pattern: required arguments are builder methods,
//! optional ones fall back to the configured defaults.
//!
//! `refresh` swaps the state atomically; a failed refresh leaves the
//! previous snapshot in place, so readers never observe a half-loaded state.

use crate::config::Config;
use crate::error::CarburantesError;
use crate::geocoding::{GeoPoint, Geocoder};
use crate::ranking::{best_stations, stations_by_distance, RankWeights};
use crate::snapshot::error::QueryError;
use crate::snapshot::frame::SnapshotLazyFrame;
use crate::stations::station_index::StationIndex;
use crate::store::snapshot_store::{DateWindow, SnapshotStore};
use crate::types::fuel::FuelType;
use crate::types::station::{StationPrice, TrendPeriod, TrendPoint, ZoneStats};
use bon::bon;
use log::{debug, error, info};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task;

/// A latitude/longitude pair in WGS84 degrees.
///
/// ```
/// use carburantes::LatLon;
/// let puerta_del_sol = LatLon(40.4168, -3.7038);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl From<GeoPoint> for LatLon {
    fn from(point: GeoPoint) -> Self {
        LatLon(point.latitude, point.longitude)
    }
}

/// Everything derived from one snapshot file.
struct SnapshotState {
    path: PathBuf,
    df: DataFrame,
    index: StationIndex,
}

impl SnapshotState {
    fn frame(&self) -> SnapshotLazyFrame {
        SnapshotLazyFrame::new(self.df.clone().lazy())
    }
}

/// The fuel-price client. Construct once, share behind an `Arc`.
pub struct Carburantes {
    store: SnapshotStore,
    geocoder: Geocoder,
    default_radius_km: f64,
    default_limit: usize,
    weights: RankWeights,
    state: RwLock<Option<Arc<SnapshotState>>>,
}

#[bon]
impl Carburantes {
    /// Opens the snapshot store and builds the HTTP client. No snapshot is
    /// loaded yet; call [`Carburantes::refresh`] before querying.
    pub async fn new(config: &Config) -> Result<Self, CarburantesError> {
        let http = reqwest::Client::builder()
            .user_agent(config.geocoding_user_agent.clone())
            .build()
            .map_err(CarburantesError::HttpClient)?;
        Ok(Carburantes {
            store: SnapshotStore::open(config.snapshot_dir()).await?,
            geocoder: Geocoder::new(http, config.geocoding_url.clone()),
            default_radius_km: config.default_radius_km,
            default_limit: config.default_limit,
            weights: RankWeights {
                price: config.price_weight,
                distance: config.distance_weight,
            },
            state: RwLock::new(None),
        })
    }

    /// Loads the latest snapshot into memory and rebuilds the station index.
    /// A no-op when the latest snapshot is already loaded.
    pub async fn refresh(&self) -> Result<(), CarburantesError> {
        let latest = self
            .store
            .latest_snapshot()
            .await?
            .ok_or(CarburantesError::NoSnapshot)?;

        if let Some(state) = self.state.read().await.as_ref() {
            if state.path == latest {
                debug!("Snapshot {} already loaded", latest.display());
                return Ok(());
            }
        }

        let frame = self.store.scan(&latest)?;
        let (df, index) = task::spawn_blocking(move || {
            let df = frame.collect().map_err(QueryError::from)?;
            let index = StationIndex::from_frame(&df)?;
            Ok::<_, CarburantesError>((df, index))
        })
        .await??;
        let state = SnapshotState {
            path: latest.clone(),
            df,
            index,
        };
        info!(
            "Loaded snapshot {} ({} rows, {} indexed stations)",
            latest.display(),
            state.df.height(),
            state.index.len()
        );
        *self.state.write().await = Some(Arc::new(state));
        Ok(())
    }

    /// Re-runs [`Carburantes::refresh`] every `interval` forever. Failures
    /// are logged; the previous snapshot stays live.
    pub async fn run_refresh_loop(self: Arc<Self>, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            if let Err(e) = self.refresh().await {
                error!("Snapshot refresh failed: {e}");
            }
        }
    }

    async fn state(&self) -> Result<Arc<SnapshotState>, CarburantesError> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(CarburantesError::NoSnapshot)
    }

    async fn locate(&self, address: &str) -> Result<GeoPoint, CarburantesError> {
        self.geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| CarburantesError::AddressNotFound {
                address: address.to_string(),
            })
    }

    /// The cheapest stations for a fuel in one zip code.
    #[builder]
    pub async fn cheapest_by_zip(
        &self,
        zip_code: &str,
        fuel: FuelType,
        limit: Option<usize>,
    ) -> Result<Vec<StationPrice>, CarburantesError> {
        let limit = limit.unwrap_or(self.default_limit);
        let state = self.state().await?;
        Ok(state.frame().cheapest_by_zip(zip_code, fuel, limit)?)
    }

    /// The nearest stations selling a fuel around an address.
    #[builder]
    pub async fn nearest_by_address(
        &self,
        address: &str,
        fuel: FuelType,
        limit: Option<usize>,
    ) -> Result<Vec<StationPrice>, CarburantesError> {
        let point = self.locate(address).await?;
        self.nearest_by_location()
            .location(point.into())
            .fuel(fuel)
            .maybe_limit(limit)
            .call()
            .await
    }

    /// The nearest stations selling a fuel around a coordinate.
    #[builder]
    pub async fn nearest_by_location(
        &self,
        location: LatLon,
        fuel: FuelType,
        limit: Option<usize>,
    ) -> Result<Vec<StationPrice>, CarburantesError> {
        let limit = limit.unwrap_or(self.default_limit);
        let state = self.state().await?;
        let candidates = state.index.nearest(location.0, location.1, fuel, limit);
        Ok(stations_by_distance(&candidates, fuel))
    }

    /// The cheapest stations within a radius around an address.
    #[builder]
    pub async fn cheapest_by_address(
        &self,
        address: &str,
        fuel: FuelType,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<StationPrice>, CarburantesError> {
        let radius_km = radius_km.unwrap_or(self.default_radius_km);
        let limit = limit.unwrap_or(self.default_limit);
        let point = self.locate(address).await?;
        let state = self.state().await?;

        let candidates = state
            .index
            .within_radius(point.latitude, point.longitude, fuel, radius_km);
        let mut stations = stations_by_distance(&candidates, fuel);
        stations.sort_by(|a, b| a.price.total_cmp(&b.price));
        stations.truncate(limit);
        Ok(stations)
    }

    /// The best price/distance trade-offs within a radius around an address.
    #[builder]
    pub async fn best_by_address(
        &self,
        address: &str,
        fuel: FuelType,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<StationPrice>, CarburantesError> {
        let radius_km = radius_km.unwrap_or(self.default_radius_km);
        let limit = limit.unwrap_or(self.default_limit);
        let point = self.locate(address).await?;
        let state = self.state().await?;

        let candidates = state
            .index
            .within_radius(point.latitude, point.longitude, fuel, radius_km);
        Ok(best_stations(&candidates, fuel, self.weights, limit))
    }

    /// Per-zip price aggregates for one province, cheapest first. Without a
    /// limit every zip code in the province is returned.
    #[builder]
    pub async fn cheapest_zones(
        &self,
        province: &str,
        fuel: FuelType,
        limit: Option<usize>,
    ) -> Result<Vec<ZoneStats>, CarburantesError> {
        let state = self.state().await?;
        Ok(state.frame().cheapest_zones(province, fuel, limit)?)
    }

    /// Daily price aggregates for one zip code over a trend period. Empty
    /// when the window holds no snapshots.
    #[builder]
    pub async fn price_trend(
        &self,
        zip_code: &str,
        fuel: FuelType,
        period: Option<TrendPeriod>,
    ) -> Result<Vec<TrendPoint>, CarburantesError> {
        let period = period.unwrap_or(TrendPeriod::Month);
        let window = DateWindow::days_back(period.days_back());
        let Some(frame) = self.store.scan_window(window).await? else {
            return Ok(vec![]);
        };
        let zip_code = zip_code.to_string();
        let points =
            task::spawn_blocking(move || SnapshotLazyFrame::new(frame).price_trend(&zip_code, fuel))
                .await??;
        Ok(points)
    }

    /// Every distinct province in the loaded snapshot.
    pub async fn provinces(&self) -> Result<Vec<String>, CarburantesError> {
        let state = self.state().await?;
        Ok(state.frame().provinces()?)
    }
}

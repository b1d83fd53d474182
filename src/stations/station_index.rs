//! In-memory spatial index over the stations of one snapshot.
//!
//! Built once per snapshot refresh from the snapshot frame, then queried for
//! nearest-station and radius lookups. The R-tree orders candidates by
//! squared euclidean distance in degree space; the final distances and
//! ordering always come from the haversine formula.

use crate::stations::error::StationIndexError;
use crate::types::fuel::FuelType;
use haversine::{distance, Location as HaversineLocation, Units};
use log::info;
use polars::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::cmp::Ordering;

/// Degrees per kilometer at the equator, used to size R-tree search windows.
const DEGREES_PER_KM: f64 = 1.0 / 111.0;
/// Widens degree-space windows to cover longitude shrink at Spanish latitudes.
const RADIUS_MARGIN: f64 = 1.5;

/// One station with coordinates and its full price list.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedStation {
    pub label: String,
    pub address: String,
    pub municipality: String,
    pub province: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    prices: [Option<f64>; FuelType::ALL.len()],
}

impl IndexedStation {
    /// The station's price for `fuel`, `None` when not sold. Zero and
    /// negative feed values count as not sold.
    pub fn price(&self, fuel: FuelType) -> Option<f64> {
        self.prices[fuel.index()].filter(|price| *price > 0.0)
    }
}

impl RTreeObject for IndexedStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

impl PointDistance for IndexedStation {
    /// Squared euclidean distance in degree space, the cheap ordering the
    /// R-tree traversal runs on.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lat = self.latitude - point[0];
        let d_lon = self.longitude - point[1];
        d_lat * d_lat + d_lon * d_lon
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance(
        HaversineLocation {
            latitude: lat1,
            longitude: lon1,
        },
        HaversineLocation {
            latitude: lat2,
            longitude: lon2,
        },
        Units::Kilometers,
    )
}

#[derive(Debug, Clone)]
pub struct StationIndex {
    rtree: RTree<IndexedStation>,
    len: usize,
}

impl StationIndex {
    /// Builds the index from a snapshot frame. Rows without coordinates or
    /// without a single positive price are skipped; they can never answer a
    /// spatial query.
    pub fn from_frame(df: &DataFrame) -> Result<Self, StationIndexError> {
        let label = df.column("label")?.str()?;
        let address = df.column("address")?.str()?;
        let municipality = df.column("municipality")?.str()?;
        let province = df.column("province")?.str()?;
        let zip_code = df.column("zip_code")?.str()?;
        let latitude = df.column("latitude")?.f64()?;
        let longitude = df.column("longitude")?.f64()?;
        let price_columns = FuelType::ALL
            .iter()
            .map(|fuel| df.column(fuel.column_name()).and_then(|c| c.f64()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut stations = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (Some(lat), Some(lon)) = (latitude.get(row), longitude.get(row)) else {
                continue;
            };
            let mut prices = [None; FuelType::ALL.len()];
            for (slot, column) in prices.iter_mut().zip(&price_columns) {
                *slot = column.get(row);
            }
            if !prices.iter().any(|p| p.is_some_and(|v| v > 0.0)) {
                continue;
            }
            stations.push(IndexedStation {
                label: label.get(row).unwrap_or_default().to_string(),
                address: address.get(row).unwrap_or_default().to_string(),
                municipality: municipality.get(row).unwrap_or_default().to_string(),
                province: province.get(row).unwrap_or_default().to_string(),
                zip_code: zip_code.get(row).unwrap_or_default().to_string(),
                latitude: lat,
                longitude: lon,
                prices,
            });
        }
        info!(
            "Indexed {} of {} stations with coordinates",
            stations.len(),
            df.height()
        );
        let len = stations.len();
        Ok(StationIndex {
            rtree: RTree::bulk_load(stations),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `limit` nearest stations selling `fuel`, with haversine distances,
    /// closest first.
    pub fn nearest(
        &self,
        latitude: f64,
        longitude: f64,
        fuel: FuelType,
        limit: usize,
    ) -> Vec<(IndexedStation, f64)> {
        if limit == 0 {
            return vec![];
        }
        // Over-fetch: the fuel filter drops candidates and euclidean order in
        // degree space can disagree with haversine order near the cutoff.
        let candidate_limit = (limit * 4).max(40);
        let mut results: Vec<(IndexedStation, f64)> = self
            .rtree
            .nearest_neighbor_iter(&[latitude, longitude])
            .filter(|station| station.price(fuel).is_some())
            .take(candidate_limit)
            .map(|station| {
                let dist = distance_km(latitude, longitude, station.latitude, station.longitude);
                (station.clone(), dist)
            })
            .collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        results.truncate(limit);
        results
    }

    /// Every station selling `fuel` within `radius_km`, closest first.
    pub fn within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        fuel: FuelType,
        radius_km: f64,
    ) -> Vec<(IndexedStation, f64)> {
        let radius_degrees = radius_km * DEGREES_PER_KM * RADIUS_MARGIN;
        let mut results: Vec<(IndexedStation, f64)> = self
            .rtree
            .locate_within_distance([latitude, longitude], radius_degrees * radius_degrees)
            .filter(|station| station.price(fuel).is_some())
            .filter_map(|station| {
                let dist = distance_km(latitude, longitude, station.latitude, station.longitude);
                (dist <= radius_km).then(|| (station.clone(), dist))
            })
            .collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        results
    }
}

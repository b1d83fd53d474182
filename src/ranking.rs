//! Composite price/distance ranking for "best station" queries.
//!
//! Candidates are ranked separately by price and by distance, then combined
//! into a weighted score (lower is better). Ranks use competition ranking:
//! tied values share the same rank, 1 + the number of strictly smaller
//! values.

use crate::stations::station_index::IndexedStation;
use crate::types::fuel::FuelType;
use crate::types::station::StationPrice;
use ordered_float::OrderedFloat;

/// Relative weight of price versus distance in the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankWeights {
    pub price: f64,
    pub distance: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        RankWeights {
            price: 0.6,
            distance: 0.4,
        }
    }
}

/// Competition ("min") rank of every value: 1 + the count of strictly
/// smaller values. Ties share a rank.
fn min_rank(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|v| 1.0 + values.iter().filter(|other| *other < v).count() as f64)
        .collect()
}

/// Scores `candidates` (station, haversine distance km) for `fuel` and
/// returns the `limit` best, lowest score first. Candidates without a price
/// for `fuel` are dropped.
pub fn best_stations(
    candidates: &[(IndexedStation, f64)],
    fuel: FuelType,
    weights: RankWeights,
    limit: usize,
) -> Vec<StationPrice> {
    let priced: Vec<(&IndexedStation, f64, f64)> = candidates
        .iter()
        .filter_map(|(station, dist)| station.price(fuel).map(|price| (station, price, *dist)))
        .collect();

    let price_ranks = min_rank(&priced.iter().map(|(_, price, _)| *price).collect::<Vec<_>>());
    let distance_ranks = min_rank(&priced.iter().map(|(_, _, dist)| *dist).collect::<Vec<_>>());

    let mut scored: Vec<StationPrice> = priced
        .iter()
        .zip(price_ranks.iter().zip(&distance_ranks))
        .map(|((station, price, dist), (price_rank, distance_rank))| StationPrice {
            label: station.label.clone(),
            address: station.address.clone(),
            municipality: station.municipality.clone(),
            province: station.province.clone(),
            zip_code: station.zip_code.clone(),
            latitude: Some(station.latitude),
            longitude: Some(station.longitude),
            price: *price,
            distance_km: Some(*dist),
            score: Some(weights.price * price_rank + weights.distance * distance_rank),
        })
        .collect();

    scored.sort_by_key(|s| {
        (
            OrderedFloat(s.score.unwrap_or(f64::MAX)),
            OrderedFloat(s.distance_km.unwrap_or(f64::MAX)),
        )
    });
    scored.truncate(limit);
    scored
}

/// Maps nearest-station candidates straight to results, keeping the
/// distance order and attaching the price of `fuel`.
pub fn stations_by_distance(
    candidates: &[(IndexedStation, f64)],
    fuel: FuelType,
) -> Vec<StationPrice> {
    candidates
        .iter()
        .filter_map(|(station, dist)| {
            station.price(fuel).map(|price| StationPrice {
                label: station.label.clone(),
                address: station.address.clone(),
                municipality: station.municipality.clone(),
                province: station.province.clone(),
                zip_code: station.zip_code.clone(),
                latitude: Some(station.latitude),
                longitude: Some(station.longitude),
                price,
                distance_km: Some(*dist),
                score: None,
            })
        })
        .collect()
}

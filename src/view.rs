//! View-model aggregates served alongside raw query results.
//!
//! These are the dashboard headline numbers: one summary object per station
//! list, KPI blocks for trends and zone rankings, plus display formatting
//! for prices and distances.

use crate::types::station::{StationPrice, TrendPoint, ZoneStats};
use serde::Serialize;

pub fn format_price(price: f64) -> String {
    format!("{price:.3} EUR/L")
}

pub fn format_distance(km: f64) -> String {
    format!("{km:.2} km")
}

/// Signed price delta, e.g. `+0.012 EUR/L` / `-0.034 EUR/L`.
pub fn format_delta(delta: f64) -> String {
    format!("{delta:+.3} EUR/L")
}

/// Headline numbers over one station result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub count: usize,
    pub best_price: f64,
    pub best_price_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f64>,
}

/// `None` when the result list is empty.
pub fn station_summary(stations: &[StationPrice]) -> Option<StationSummary> {
    let best_price = stations
        .iter()
        .map(|s| s.price)
        .min_by(|a, b| a.total_cmp(b))?;
    let distances: Vec<f64> = stations.iter().filter_map(|s| s.distance_km).collect();
    Some(StationSummary {
        count: stations.len(),
        best_price,
        best_price_display: format_price(best_price),
        min_distance_km: distances.iter().copied().min_by(f64::total_cmp),
        max_distance_km: distances.iter().copied().max_by(f64::total_cmp),
        best_score: stations
            .iter()
            .filter_map(|s| s.score)
            .min_by(f64::total_cmp),
    })
}

/// Headline numbers over one price trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendKpis {
    pub current_avg: f64,
    pub current_avg_display: String,
    pub period_min: f64,
    pub period_max: f64,
    /// Change of the daily average over the period, last minus first day.
    pub delta: f64,
    pub delta_display: String,
}

pub fn trend_kpis(trend: &[TrendPoint]) -> Option<TrendKpis> {
    let first = trend.first()?;
    let last = trend.last()?;
    let period_min = trend
        .iter()
        .map(|p| p.min_price)
        .min_by(f64::total_cmp)?;
    let period_max = trend
        .iter()
        .map(|p| p.max_price)
        .max_by(f64::total_cmp)?;
    let delta = last.avg_price - first.avg_price;
    Some(TrendKpis {
        current_avg: last.avg_price,
        current_avg_display: format_price(last.avg_price),
        period_min,
        period_max,
        delta,
        delta_display: format_delta(delta),
    })
}

/// Headline numbers over one zone ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneKpis {
    pub zone_count: usize,
    pub cheapest_zip: String,
    pub cheapest_avg_display: String,
    /// Mean of the per-zip average prices.
    pub province_avg_price: f64,
}

pub fn zone_kpis(zones: &[ZoneStats]) -> Option<ZoneKpis> {
    let cheapest = zones
        .iter()
        .min_by(|a, b| a.avg_price.total_cmp(&b.avg_price))?;
    let province_avg_price =
        zones.iter().map(|z| z.avg_price).sum::<f64>() / zones.len() as f64;
    Some(ZoneKpis {
        zone_count: zones.len(),
        cheapest_zip: cheapest.zip_code.clone(),
        cheapest_avg_display: format_price(cheapest.avg_price),
        province_avg_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(price: f64, distance_km: Option<f64>, score: Option<f64>) -> StationPrice {
        StationPrice {
            label: "repsol".into(),
            address: "calle mayor 1".into(),
            municipality: "madrid".into(),
            province: "madrid".into(),
            zip_code: "28001".into(),
            latitude: Some(40.4168),
            longitude: Some(-3.7038),
            price,
            distance_km,
            score,
        }
    }

    #[test]
    fn formatting() {
        assert_eq!(format_price(1.5), "1.500 EUR/L");
        assert_eq!(format_distance(2.0), "2.00 km");
        assert_eq!(format_delta(0.0123), "+0.012 EUR/L");
        assert_eq!(format_delta(-0.034), "-0.034 EUR/L");
    }

    #[test]
    fn station_summary_over_ranked_results() {
        let stations = vec![
            station(1.5, Some(0.8), Some(2.2)),
            station(1.4, Some(3.1), Some(1.8)),
        ];
        let summary = station_summary(&stations).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.best_price, 1.4);
        assert_eq!(summary.best_price_display, "1.400 EUR/L");
        assert_eq!(summary.min_distance_km, Some(0.8));
        assert_eq!(summary.max_distance_km, Some(3.1));
        assert_eq!(summary.best_score, Some(1.8));
    }

    #[test]
    fn station_summary_without_distances() {
        let summary = station_summary(&[station(1.45, None, None)]).unwrap();
        assert_eq!(summary.min_distance_km, None);
        assert_eq!(summary.best_score, None);
        assert!(station_summary(&[]).is_none());
    }

    #[test]
    fn trend_kpis_delta_is_last_minus_first() {
        let trend = vec![
            TrendPoint {
                date: "2025-01-13".into(),
                avg_price: 1.50,
                min_price: 1.40,
                max_price: 1.60,
            },
            TrendPoint {
                date: "2025-01-14".into(),
                avg_price: 1.52,
                min_price: 1.38,
                max_price: 1.65,
            },
            TrendPoint {
                date: "2025-01-15".into(),
                avg_price: 1.47,
                min_price: 1.42,
                max_price: 1.58,
            },
        ];
        let kpis = trend_kpis(&trend).unwrap();
        assert_eq!(kpis.current_avg, 1.47);
        assert_eq!(kpis.period_min, 1.38);
        assert_eq!(kpis.period_max, 1.65);
        assert!((kpis.delta + 0.03).abs() < 1e-9);
        assert_eq!(kpis.delta_display, "-0.030 EUR/L");
        assert!(trend_kpis(&[]).is_none());
    }

    #[test]
    fn zone_kpis_pick_the_cheapest_zip() {
        let zones = vec![
            ZoneStats {
                zip_code: "28001".into(),
                avg_price: 1.50,
                min_price: 1.40,
                station_count: 4,
            },
            ZoneStats {
                zip_code: "28002".into(),
                avg_price: 1.42,
                min_price: 1.30,
                station_count: 2,
            },
        ];
        let kpis = zone_kpis(&zones).unwrap();
        assert_eq!(kpis.zone_count, 2);
        assert_eq!(kpis.cheapest_zip, "28002");
        assert!((kpis.province_avg_price - 1.46).abs() < 1e-9);
    }
}

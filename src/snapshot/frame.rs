//! Lazy queries over snapshot-schema frames.
//!
//! [`SnapshotLazyFrame`] wraps a Polars `LazyFrame` whose schema is the
//! snapshot schema, either a single snapshot file or a concatenation of
//! several (for trends). All query methods keep only rows with a positive
//! price for the requested fuel; the feed leaves prices null or zero for
//! fuels a station does not sell.

use crate::snapshot::error::QueryError;
use crate::types::fuel::FuelType;
use crate::types::station::{StationPrice, TrendPoint, ZoneStats};
use polars::prelude::*;

/// A lazy view over snapshot rows.
#[derive(Clone)]
pub struct SnapshotLazyFrame {
    pub frame: LazyFrame,
}

impl SnapshotLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Returns a new view with `predicate` applied lazily.
    pub fn filter(&self, predicate: Expr) -> SnapshotLazyFrame {
        SnapshotLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// The up-to-`limit` cheapest stations for `fuel` in one zip code,
    /// cheapest first.
    pub fn cheapest_by_zip(
        &self,
        zip_code: &str,
        fuel: FuelType,
        limit: usize,
    ) -> Result<Vec<StationPrice>, QueryError> {
        let price = fuel.column_name();
        let df = self
            .frame
            .clone()
            .filter(
                col("zip_code")
                    .eq(lit(zip_code.to_string()))
                    .and(col(price).gt(lit(0.0))),
            )
            .sort([price], SortMultipleOptions::default())
            .limit(limit as IdxSize)
            .collect()?;
        Ok(rows_to_station_prices(&df, fuel)?)
    }

    /// Per-zip price aggregates for one province, cheapest average first.
    /// Every zip group is returned unless `limit` is given.
    pub fn cheapest_zones(
        &self,
        province: &str,
        fuel: FuelType,
        limit: Option<usize>,
    ) -> Result<Vec<ZoneStats>, QueryError> {
        let price = fuel.column_name();
        let mut plan = self
            .frame
            .clone()
            .filter(
                col("province")
                    .eq(lit(province.trim().to_lowercase()))
                    .and(col(price).gt(lit(0.0))),
            )
            .group_by([col("zip_code")])
            .agg([
                col(price).mean().alias("avg_price"),
                col(price).min().alias("min_price"),
                col(price).count().alias("station_count"),
            ])
            .sort(["avg_price"], SortMultipleOptions::default());
        if let Some(limit) = limit {
            plan = plan.limit(limit as IdxSize);
        }
        let df = plan.collect()?;

        let zip_code = df.column("zip_code")?.str()?;
        let avg_price = df.column("avg_price")?.f64()?;
        let min_price = df.column("min_price")?.f64()?;
        let station_count = df.column("station_count")?.u32()?;

        let mut zones = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (Some(zip), Some(avg), Some(min), Some(count)) = (
                zip_code.get(row),
                avg_price.get(row),
                min_price.get(row),
                station_count.get(row),
            ) else {
                continue;
            };
            zones.push(ZoneStats {
                zip_code: zip.to_string(),
                avg_price: avg,
                min_price: min,
                station_count: count,
            });
        }
        Ok(zones)
    }

    /// Every distinct province in the snapshot, sorted.
    pub fn provinces(&self) -> Result<Vec<String>, QueryError> {
        let df = self
            .frame
            .clone()
            .select([col("province")])
            .unique_stable(None, UniqueKeepStrategy::First)
            .sort(["province"], SortMultipleOptions::default())
            .collect()?;
        let provinces = df
            .column("province")?
            .str()?
            .into_iter()
            .flatten()
            .map(String::from)
            .collect();
        Ok(provinces)
    }

    /// Daily average/min/max of `fuel` in one zip code, oldest date first.
    /// Run this on a window frame spanning several snapshot days.
    pub fn price_trend(&self, zip_code: &str, fuel: FuelType) -> Result<Vec<TrendPoint>, QueryError> {
        let price = fuel.column_name();
        let df = self
            .frame
            .clone()
            .filter(
                col("zip_code")
                    .eq(lit(zip_code.to_string()))
                    .and(col(price).gt(lit(0.0))),
            )
            .group_by([col("date")])
            .agg([
                col(price).mean().alias("avg_price"),
                col(price).min().alias("min_price"),
                col(price).max().alias("max_price"),
            ])
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        let date = df.column("date")?.str()?;
        let avg_price = df.column("avg_price")?.f64()?;
        let min_price = df.column("min_price")?.f64()?;
        let max_price = df.column("max_price")?.f64()?;

        let mut points = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (Some(d), Some(avg), Some(min), Some(max)) = (
                date.get(row),
                avg_price.get(row),
                min_price.get(row),
                max_price.get(row),
            ) else {
                continue;
            };
            points.push(TrendPoint {
                date: d.to_string(),
                avg_price: avg,
                min_price: min,
                max_price: max,
            });
        }
        Ok(points)
    }
}

/// Collects snapshot rows into [`StationPrice`] results with the price taken
/// from the `fuel` column. Rows with a null price are skipped.
pub(crate) fn rows_to_station_prices(
    df: &DataFrame,
    fuel: FuelType,
) -> Result<Vec<StationPrice>, PolarsError> {
    let label = df.column("label")?.str()?;
    let address = df.column("address")?.str()?;
    let municipality = df.column("municipality")?.str()?;
    let province = df.column("province")?.str()?;
    let zip_code = df.column("zip_code")?.str()?;
    let latitude = df.column("latitude")?.f64()?;
    let longitude = df.column("longitude")?.f64()?;
    let price = df.column(fuel.column_name())?.f64()?;

    let mut stations = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(price) = price.get(row) else {
            continue;
        };
        stations.push(StationPrice {
            label: label.get(row).unwrap_or_default().to_string(),
            address: address.get(row).unwrap_or_default().to_string(),
            municipality: municipality.get(row).unwrap_or_default().to_string(),
            province: province.get(row).unwrap_or_default().to_string(),
            zip_code: zip_code.get(row).unwrap_or_default().to_string(),
            latitude: latitude.get(row),
            longitude: longitude.get(row),
            price,
            distance_km: None,
            score: None,
        });
    }
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::{map_feed, RawFeed};
    use crate::ingest::ingestor::records_to_dataframe;

    fn snapshot(json: &str) -> SnapshotLazyFrame {
        let feed: RawFeed = serde_json::from_str(json).unwrap();
        let df = records_to_dataframe(&map_feed(&feed).unwrap()).unwrap();
        SnapshotLazyFrame::new(df.lazy())
    }

    fn madrid_snapshot() -> SnapshotLazyFrame {
        snapshot(
            r#"{
            "Fecha": "15/01/2025 07:00:00",
            "ResultadoConsulta": "OK",
            "ListaEESSPrecio": [
                {"Rótulo": "REPSOL", "C.P.": "28001", "Provincia": "MADRID",
                 "Precio Gasoleo A": "1,50", "Precio Gasolina 95 E5": "1,60"},
                {"Rótulo": "CEPSA", "C.P.": "28001", "Provincia": "MADRID",
                 "Precio Gasoleo A": "1,40"},
                {"Rótulo": "BP", "C.P.": "28001", "Provincia": "MADRID",
                 "Precio Gasolina 95 E5": "1,55"},
                {"Rótulo": "SHELL", "C.P.": "28002", "Provincia": "MADRID",
                 "Precio Gasoleo A": "1,30"},
                {"Rótulo": "GALP", "C.P.": "08001", "Provincia": "BARCELONA",
                 "Precio Gasoleo A": "1,45"}
            ]
        }"#,
        )
    }

    #[test]
    fn cheapest_by_zip_orders_and_limits() {
        let frame = madrid_snapshot();
        let results = frame
            .cheapest_by_zip("28001", FuelType::DieselAPrice, 3)
            .unwrap();

        // BP has no diesel price and must not appear.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "cepsa");
        assert_eq!(results[0].price, 1.40);
        assert_eq!(results[1].label, "repsol");

        let limited = frame
            .cheapest_by_zip("28001", FuelType::DieselAPrice, 1)
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].label, "cepsa");
    }

    #[test]
    fn cheapest_by_zip_unknown_zip_is_empty() {
        let frame = madrid_snapshot();
        assert!(frame
            .cheapest_by_zip("99999", FuelType::DieselAPrice, 3)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn cheapest_zones_aggregates_per_zip() {
        let frame = madrid_snapshot();
        let zones = frame
            .cheapest_zones("MADRID", FuelType::DieselAPrice, None)
            .unwrap();

        assert_eq!(zones.len(), 2);
        // 28002 has the single 1.30 station, the lowest average.
        assert_eq!(zones[0].zip_code, "28002");
        assert_eq!(zones[0].station_count, 1);
        assert_eq!(zones[1].zip_code, "28001");
        assert_eq!(zones[1].station_count, 2);
        assert!((zones[1].avg_price - 1.45).abs() < 1e-9);
        assert_eq!(zones[1].min_price, 1.40);
    }

    #[test]
    fn provinces_are_distinct_and_sorted() {
        let frame = madrid_snapshot();
        assert_eq!(frame.provinces().unwrap(), vec!["barcelona", "madrid"]);
    }

    #[test]
    fn price_trend_groups_by_date() {
        // Two snapshot days concatenated into one window frame.
        let day1 = snapshot(
            r#"{
            "Fecha": "14/01/2025 07:00:00",
            "ResultadoConsulta": "OK",
            "ListaEESSPrecio": [
                {"C.P.": "28001", "Provincia": "MADRID", "Precio Gasoleo A": "1,40"},
                {"C.P.": "28001", "Provincia": "MADRID", "Precio Gasoleo A": "1,60"}
            ]
        }"#,
        );
        let day2 = snapshot(
            r#"{
            "Fecha": "15/01/2025 07:00:00",
            "ResultadoConsulta": "OK",
            "ListaEESSPrecio": [
                {"C.P.": "28001", "Provincia": "MADRID", "Precio Gasoleo A": "1,30"}
            ]
        }"#,
        );
        let window = SnapshotLazyFrame::new(
            concat([day1.frame, day2.frame], UnionArgs::default()).unwrap(),
        );

        let trend = window.price_trend("28001", FuelType::DieselAPrice).unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, "2025-01-14");
        assert!((trend[0].avg_price - 1.50).abs() < 1e-9);
        assert_eq!(trend[0].min_price, 1.40);
        assert_eq!(trend[0].max_price, 1.60);
        assert_eq!(trend[1].date, "2025-01-15");
        assert_eq!(trend[1].avg_price, 1.30);
    }
}

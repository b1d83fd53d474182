//! Data structures for snapshot rows and query results.
//!
//! [`FuelPriceRecord`] is the canonical, normalized row written to snapshot
//! parquet files; the result types ([`StationPrice`], [`ZoneStats`],
//! [`TrendPoint`]) are what the query layer hands back to callers and what
//! the dashboard API serializes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A normalized fuel-price observation for a single station, as stored in a
/// snapshot file. Field order matches the snapshot column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPriceRecord {
    /// Observation timestamp of the feed, converted to UTC.
    pub timestamp: DateTime<Utc>,
    /// UTC calendar date of `timestamp`.
    pub date: NaiveDate,
    /// UTC hour of `timestamp` (0-23).
    pub hour: i32,
    pub zip_code: String,
    pub municipality_id: String,
    pub province_id: String,
    pub sale_type: String,
    pub label: String,
    pub address: String,
    pub municipality: String,
    pub province: String,
    pub locality: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub biodiesel_price: Option<f64>,
    pub bioethanol_price: Option<f64>,
    pub compressed_natural_gas_price: Option<f64>,
    pub liquefied_natural_gas_price: Option<f64>,
    pub liquefied_petroleum_gases_price: Option<f64>,
    pub diesel_a_price: Option<f64>,
    pub diesel_b_price: Option<f64>,
    pub diesel_premium_price: Option<f64>,
    pub gasoline_95_e10_price: Option<f64>,
    pub gasoline_95_e5_price: Option<f64>,
    pub gasoline_95_e5_premium_price: Option<f64>,
    pub gasoline_98_e10_price: Option<f64>,
    pub gasoline_98_e5_price: Option<f64>,
    pub hydrogen_price: Option<f64>,
}

impl FuelPriceRecord {
    /// Price for `fuel`, if the station sells it.
    pub fn price(&self, fuel: crate::types::fuel::FuelType) -> Option<f64> {
        use crate::types::fuel::FuelType::*;
        match fuel {
            BiodieselPrice => self.biodiesel_price,
            BioethanolPrice => self.bioethanol_price,
            CompressedNaturalGasPrice => self.compressed_natural_gas_price,
            LiquefiedNaturalGasPrice => self.liquefied_natural_gas_price,
            LiquefiedPetroleumGasesPrice => self.liquefied_petroleum_gases_price,
            DieselAPrice => self.diesel_a_price,
            DieselBPrice => self.diesel_b_price,
            DieselPremiumPrice => self.diesel_premium_price,
            Gasoline95E10Price => self.gasoline_95_e10_price,
            Gasoline95E5Price => self.gasoline_95_e5_price,
            Gasoline95E5PremiumPrice => self.gasoline_95_e5_premium_price,
            Gasoline98E10Price => self.gasoline_98_e10_price,
            Gasoline98E5Price => self.gasoline_98_e5_price,
            HydrogenPrice => self.hydrogen_price,
        }
    }
}

/// A ranked station result: one station with the price of the requested fuel
/// and, for location-based queries, its distance and composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPrice {
    pub label: String,
    pub address: String,
    pub municipality: String,
    pub province: String,
    pub zip_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Per-zip aggregate over one province, ordered by average price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStats {
    pub zip_code: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub station_count: u32,
}

/// One day of a price trend: aggregate prices over a zip code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// How far back a price trend reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum TrendPeriod {
    Week,
    Month,
    Quarter,
}

impl TrendPeriod {
    /// The number of snapshot days covered by this period.
    pub fn days_back(&self) -> i64 {
        match self {
            TrendPeriod::Week => 7,
            TrendPeriod::Month => 30,
            TrendPeriod::Quarter => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Week => "week",
            TrendPeriod::Month => "month",
            TrendPeriod::Quarter => "quarter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fuel::FuelType;

    #[test]
    fn trend_period_days() {
        assert_eq!(TrendPeriod::Week.days_back(), 7);
        assert_eq!(TrendPeriod::Month.days_back(), 30);
        assert_eq!(TrendPeriod::Quarter.days_back(), 90);
    }

    #[test]
    fn record_price_lookup() {
        let record = FuelPriceRecord {
            timestamp: Utc::now(),
            date: Utc::now().date_naive(),
            hour: 7,
            zip_code: "28001".into(),
            municipality_id: "4354".into(),
            province_id: "28".into(),
            sale_type: "p".into(),
            label: "repsol".into(),
            address: "calle mayor 1".into(),
            municipality: "madrid".into(),
            province: "madrid".into(),
            locality: "madrid".into(),
            latitude: Some(40.4168),
            longitude: Some(-3.7038),
            biodiesel_price: None,
            bioethanol_price: None,
            compressed_natural_gas_price: None,
            liquefied_natural_gas_price: None,
            liquefied_petroleum_gases_price: None,
            diesel_a_price: Some(1.459),
            diesel_b_price: None,
            diesel_premium_price: None,
            gasoline_95_e10_price: None,
            gasoline_95_e5_price: Some(1.549),
            gasoline_95_e5_premium_price: None,
            gasoline_98_e10_price: None,
            gasoline_98_e5_price: None,
            hydrogen_price: None,
        };
        assert_eq!(record.price(FuelType::DieselAPrice), Some(1.459));
        assert_eq!(record.price(FuelType::Gasoline95E5Price), Some(1.549));
        assert_eq!(record.price(FuelType::HydrogenPrice), None);
    }
}

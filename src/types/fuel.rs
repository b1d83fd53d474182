//! Fuel product types published by the minetur feed.
//!
//! Every fuel maps to one price column of the snapshot schema. The serde
//! representation matches the column name, so the same identifiers work as
//! API query parameters (`fuel_type=diesel_a_price`) and as Polars columns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fourteen fuel products carried by the feed.
///
/// Renames are explicit because the digit-separating underscores of the
/// column names (`gasoline_95_e5_price`) are not what `rename_all` derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum FuelType {
    #[serde(rename = "diesel_a_price")]
    #[value(name = "diesel_a_price")]
    DieselAPrice,
    #[serde(rename = "diesel_b_price")]
    #[value(name = "diesel_b_price")]
    DieselBPrice,
    #[serde(rename = "diesel_premium_price")]
    #[value(name = "diesel_premium_price")]
    DieselPremiumPrice,
    #[serde(rename = "gasoline_95_e5_price")]
    #[value(name = "gasoline_95_e5_price")]
    Gasoline95E5Price,
    #[serde(rename = "gasoline_95_e10_price")]
    #[value(name = "gasoline_95_e10_price")]
    Gasoline95E10Price,
    #[serde(rename = "gasoline_95_e5_premium_price")]
    #[value(name = "gasoline_95_e5_premium_price")]
    Gasoline95E5PremiumPrice,
    #[serde(rename = "gasoline_98_e5_price")]
    #[value(name = "gasoline_98_e5_price")]
    Gasoline98E5Price,
    #[serde(rename = "gasoline_98_e10_price")]
    #[value(name = "gasoline_98_e10_price")]
    Gasoline98E10Price,
    #[serde(rename = "biodiesel_price")]
    #[value(name = "biodiesel_price")]
    BiodieselPrice,
    #[serde(rename = "bioethanol_price")]
    #[value(name = "bioethanol_price")]
    BioethanolPrice,
    #[serde(rename = "compressed_natural_gas_price")]
    #[value(name = "compressed_natural_gas_price")]
    CompressedNaturalGasPrice,
    #[serde(rename = "liquefied_natural_gas_price")]
    #[value(name = "liquefied_natural_gas_price")]
    LiquefiedNaturalGasPrice,
    #[serde(rename = "liquefied_petroleum_gases_price")]
    #[value(name = "liquefied_petroleum_gases_price")]
    LiquefiedPetroleumGasesPrice,
    #[serde(rename = "hydrogen_price")]
    #[value(name = "hydrogen_price")]
    HydrogenPrice,
}

impl FuelType {
    /// All fuel types, in snapshot column order.
    pub const ALL: [FuelType; 14] = [
        FuelType::BiodieselPrice,
        FuelType::BioethanolPrice,
        FuelType::CompressedNaturalGasPrice,
        FuelType::LiquefiedNaturalGasPrice,
        FuelType::LiquefiedPetroleumGasesPrice,
        FuelType::DieselAPrice,
        FuelType::DieselBPrice,
        FuelType::DieselPremiumPrice,
        FuelType::Gasoline95E10Price,
        FuelType::Gasoline95E5Price,
        FuelType::Gasoline95E5PremiumPrice,
        FuelType::Gasoline98E10Price,
        FuelType::Gasoline98E5Price,
        FuelType::HydrogenPrice,
    ];

    /// The snapshot column holding this fuel's price.
    pub fn column_name(&self) -> &'static str {
        match self {
            FuelType::DieselAPrice => "diesel_a_price",
            FuelType::DieselBPrice => "diesel_b_price",
            FuelType::DieselPremiumPrice => "diesel_premium_price",
            FuelType::Gasoline95E5Price => "gasoline_95_e5_price",
            FuelType::Gasoline95E10Price => "gasoline_95_e10_price",
            FuelType::Gasoline95E5PremiumPrice => "gasoline_95_e5_premium_price",
            FuelType::Gasoline98E5Price => "gasoline_98_e5_price",
            FuelType::Gasoline98E10Price => "gasoline_98_e10_price",
            FuelType::BiodieselPrice => "biodiesel_price",
            FuelType::BioethanolPrice => "bioethanol_price",
            FuelType::CompressedNaturalGasPrice => "compressed_natural_gas_price",
            FuelType::LiquefiedNaturalGasPrice => "liquefied_natural_gas_price",
            FuelType::LiquefiedPetroleumGasesPrice => "liquefied_petroleum_gases_price",
            FuelType::HydrogenPrice => "hydrogen_price",
        }
    }

    /// Spanish display label, as shown by the dashboard.
    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::DieselAPrice => "Diesel A",
            FuelType::DieselBPrice => "Diesel B",
            FuelType::DieselPremiumPrice => "Diesel Premium",
            FuelType::Gasoline95E5Price => "Gasolina 95 E5",
            FuelType::Gasoline95E10Price => "Gasolina 95 E10",
            FuelType::Gasoline95E5PremiumPrice => "Gasolina 95 E5 Premium",
            FuelType::Gasoline98E5Price => "Gasolina 98 E5",
            FuelType::Gasoline98E10Price => "Gasolina 98 E10",
            FuelType::BiodieselPrice => "Biodiesel",
            FuelType::BioethanolPrice => "Bioetanol",
            FuelType::CompressedNaturalGasPrice => "Gas Natural Comprimido",
            FuelType::LiquefiedNaturalGasPrice => "Gas Natural Licuado",
            FuelType::LiquefiedPetroleumGasesPrice => "Gases Licuados del Petroleo",
            FuelType::HydrogenPrice => "Hidrogeno",
        }
    }

    /// Position of this fuel inside [`FuelType::ALL`], used by the station
    /// index to store per-station price arrays.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .iter()
            .copied()
            .find(|f| f.column_name() == s)
            .ok_or_else(|| format!("unknown fuel type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for fuel in FuelType::ALL {
            let parsed: FuelType = fuel.column_name().parse().unwrap();
            assert_eq!(parsed, fuel);
        }
    }

    #[test]
    fn serde_matches_column_name() {
        let json = serde_json::to_string(&FuelType::Gasoline95E5Price).unwrap();
        assert_eq!(json, "\"gasoline_95_e5_price\"");
        let back: FuelType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FuelType::Gasoline95E5Price);
    }

    #[test]
    fn index_is_stable() {
        for (i, fuel) in FuelType::ALL.iter().enumerate() {
            assert_eq!(fuel.index(), i);
        }
    }

    #[test]
    fn unknown_fuel_is_rejected() {
        assert!("kerosene_price".parse::<FuelType>().is_err());
    }
}

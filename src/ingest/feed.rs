//! Raw types and record mapping for the minetur fuel-price feed.
//!
//! The feed is one JSON document: a `Fecha` header timestamp in local
//! Madrid time plus a `ListaEESSPrecio` array of station records with
//! Spanish field names and comma-decimal price strings. Everything here is
//! pure mapping; fetching lives in [`crate::ingest::ingestor`].

use crate::ingest::error::IngestError;
use crate::types::station::FuelPriceRecord;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Europe::Madrid;
use serde::Deserialize;

pub(crate) const FEED_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// The full feed document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeed {
    #[serde(rename = "Fecha")]
    pub fecha: String,
    #[serde(rename = "ListaEESSPrecio", default)]
    pub stations: Vec<RawStationRecord>,
    #[serde(rename = "ResultadoConsulta", default)]
    pub resultado: String,
}

/// One station entry exactly as the feed publishes it.
///
/// All fields are strings on the wire; missing keys default to empty, which
/// the normalization below turns into empty strings or `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStationRecord {
    #[serde(rename = "C.P.", default)]
    pub zip_code: String,
    #[serde(rename = "IDMunicipio", default)]
    pub municipality_id: String,
    #[serde(rename = "IDProvincia", default)]
    pub province_id: String,
    #[serde(rename = "Tipo Venta", default)]
    pub sale_type: String,
    #[serde(rename = "Rótulo", default)]
    pub label: String,
    #[serde(rename = "Dirección", default)]
    pub address: String,
    #[serde(rename = "Municipio", default)]
    pub municipality: String,
    #[serde(rename = "Provincia", default)]
    pub province: String,
    #[serde(rename = "Localidad", default)]
    pub locality: String,
    #[serde(rename = "Latitud", default)]
    pub latitude: String,
    #[serde(rename = "Longitud (WGS84)", default)]
    pub longitude: String,
    #[serde(rename = "Precio Biodiesel", default)]
    pub biodiesel_price: String,
    #[serde(rename = "Precio Bioetanol", default)]
    pub bioethanol_price: String,
    #[serde(rename = "Precio Gas Natural Comprimido", default)]
    pub compressed_natural_gas_price: String,
    #[serde(rename = "Precio Gas Natural Licuado", default)]
    pub liquefied_natural_gas_price: String,
    #[serde(rename = "Precio Gases licuados del petróleo", default)]
    pub liquefied_petroleum_gases_price: String,
    #[serde(rename = "Precio Gasoleo A", default)]
    pub diesel_a_price: String,
    #[serde(rename = "Precio Gasoleo B", default)]
    pub diesel_b_price: String,
    #[serde(rename = "Precio Gasoleo Premium", default)]
    pub diesel_premium_price: String,
    #[serde(rename = "Precio Gasolina 95 E10", default)]
    pub gasoline_95_e10_price: String,
    #[serde(rename = "Precio Gasolina 95 E5", default)]
    pub gasoline_95_e5_price: String,
    #[serde(rename = "Precio Gasolina 95 E5 Premium", default)]
    pub gasoline_95_e5_premium_price: String,
    #[serde(rename = "Precio Gasolina 98 E10", default)]
    pub gasoline_98_e10_price: String,
    #[serde(rename = "Precio Gasolina 98 E5", default)]
    pub gasoline_98_e5_price: String,
    #[serde(rename = "Precio Hidrogeno", default)]
    pub hydrogen_price: String,
}

/// Lowercase + trim, the normalization applied to every text field.
fn format_string(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Comma-decimal feed number to `f64`. Empty or unparsable values are `None`.
fn format_float(s: &str) -> Option<f64> {
    let formatted = format_string(s);
    if formatted.is_empty() {
        return None;
    }
    formatted.replace(',', ".").parse().ok()
}

/// Parses the feed header timestamp (`dd/mm/yyyy HH:MM:SS`, Madrid local
/// time) into UTC.
pub fn parse_feed_timestamp(fecha: &str) -> Result<DateTime<Utc>, IngestError> {
    let naive = NaiveDateTime::parse_from_str(fecha, FEED_DATETIME_FORMAT)
        .map_err(|source| IngestError::TimestampParse {
            value: fecha.to_string(),
            source,
        })?;
    let local = naive
        .and_local_timezone(Madrid)
        .earliest()
        .ok_or_else(|| IngestError::AmbiguousTimestamp(fecha.to_string()))?;
    Ok(local.with_timezone(&Utc))
}

/// Maps one raw station entry onto the snapshot row for `timestamp`.
pub fn map_record(record: &RawStationRecord, timestamp: DateTime<Utc>) -> FuelPriceRecord {
    FuelPriceRecord {
        timestamp,
        date: timestamp.date_naive(),
        hour: timestamp.hour() as i32,
        zip_code: format_string(&record.zip_code),
        municipality_id: format_string(&record.municipality_id),
        province_id: format_string(&record.province_id),
        sale_type: format_string(&record.sale_type),
        label: format_string(&record.label),
        address: format_string(&record.address),
        municipality: format_string(&record.municipality),
        province: format_string(&record.province),
        locality: format_string(&record.locality),
        latitude: format_float(&record.latitude),
        longitude: format_float(&record.longitude),
        biodiesel_price: format_float(&record.biodiesel_price),
        bioethanol_price: format_float(&record.bioethanol_price),
        compressed_natural_gas_price: format_float(&record.compressed_natural_gas_price),
        liquefied_natural_gas_price: format_float(&record.liquefied_natural_gas_price),
        liquefied_petroleum_gases_price: format_float(&record.liquefied_petroleum_gases_price),
        diesel_a_price: format_float(&record.diesel_a_price),
        diesel_b_price: format_float(&record.diesel_b_price),
        diesel_premium_price: format_float(&record.diesel_premium_price),
        gasoline_95_e10_price: format_float(&record.gasoline_95_e10_price),
        gasoline_95_e5_price: format_float(&record.gasoline_95_e5_price),
        gasoline_95_e5_premium_price: format_float(&record.gasoline_95_e5_premium_price),
        gasoline_98_e10_price: format_float(&record.gasoline_98_e10_price),
        gasoline_98_e5_price: format_float(&record.gasoline_98_e5_price),
        hydrogen_price: format_float(&record.hydrogen_price),
    }
}

/// Maps the full feed into normalized snapshot rows.
///
/// Fails when the header timestamp cannot be parsed or when the station list
/// is empty; individual bad fields only degrade to `None`/empty values.
pub fn map_feed(feed: &RawFeed) -> Result<Vec<FuelPriceRecord>, IngestError> {
    let timestamp = parse_feed_timestamp(&feed.fecha)?;
    log::info!(
        "Mapping feed: fecha={} utc={} stations={}",
        feed.fecha,
        timestamp,
        feed.stations.len()
    );
    if feed.stations.is_empty() {
        return Err(IngestError::EmptyFeed);
    }
    Ok(feed
        .stations
        .iter()
        .map(|record| map_record(record, timestamp))
        .collect())
}

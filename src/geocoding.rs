//! Address lookup through the Nominatim search API.
//!
//! Queries are restricted to Spain and take the single best hit. Nominatim
//! requires an identifying user agent; the caller provides the configured
//! one through the shared HTTP client.

use log::info;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Geocoding request for {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode geocoding response")]
    Decode(#[source] reqwest::Error),

    #[error("Geocoder returned a non-numeric coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// A geocoded coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Geocoder {
            http,
            base_url: base_url.into(),
        }
    }

    /// Resolves a free-form Spanish address. `Ok(None)` when Nominatim has
    /// no match; errors are reserved for transport and decoding failures.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodingError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "es"),
            ])
            .send()
            .await
            .map_err(|e| GeocodingError::NetworkRequest(self.base_url.clone(), e))?;
        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|source| GeocodingError::HttpStatus {
                url: self.base_url.clone(),
                status,
                source,
            })?;
        let hits: Vec<NominatimHit> = response.json().await.map_err(GeocodingError::Decode)?;

        let Some(hit) = hits.into_iter().next() else {
            info!("No geocoding match for '{address}'");
            return Ok(None);
        };
        let latitude = hit
            .lat
            .parse()
            .map_err(|_| GeocodingError::InvalidCoordinate(hit.lat.clone()))?;
        let longitude = hit
            .lon
            .parse()
            .map_err(|_| GeocodingError::InvalidCoordinate(hit.lon.clone()))?;
        info!("Geocoded '{address}' to ({latitude}, {longitude})");
        Ok(Some(GeoPoint {
            latitude,
            longitude,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominatim_hits_deserialize() {
        let json = r#"[{"place_id": 1, "lat": "40.4168", "lon": "-3.7038", "display_name": "Madrid"}]"#;
        let hits: Vec<NominatimHit> = serde_json::from_str(json).unwrap();
        assert_eq!(hits[0].lat, "40.4168");
        assert_eq!(hits[0].lon, "-3.7038");
    }

    #[test]
    fn empty_result_deserializes() {
        let hits: Vec<NominatimHit> = serde_json::from_str("[]").unwrap();
        assert!(hits.is_empty());
    }
}

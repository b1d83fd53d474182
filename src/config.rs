//! Environment-driven configuration.
//!
//! Every knob has a default; overrides come from `DASHBOARD_*` environment
//! variables. The data directory defaults to the platform data dir and holds
//! the snapshot store, the partitioned table, and quality metrics as
//! subdirectories.

use crate::geocoding::DEFAULT_NOMINATIM_URL;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_FEED_URL: &str =
    "https://sedeaplicaciones.minetur.gob.es/ServiciosRESTCarburantes/PreciosCarburantes/EstacionesTerrestres/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No platform data directory found; set DASHBOARD_DATA_DIR")]
    MissingDataDir,

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub feed_url: String,
    pub cache_ttl_seconds: u64,
    pub host: String,
    pub port: u16,
    pub geocoding_url: String,
    pub geocoding_user_agent: String,
    pub default_radius_km: f64,
    pub default_limit: usize,
    pub price_weight: f64,
    pub distance_weight: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match lookup("DASHBOARD_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or(ConfigError::MissingDataDir)?
                .join("carburantes"),
        };
        Ok(Config {
            data_dir,
            feed_url: lookup("DASHBOARD_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            cache_ttl_seconds: parsed(&lookup, "DASHBOARD_CACHE_TTL", 3600)?,
            host: lookup("DASHBOARD_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "DASHBOARD_PORT", 8080)?,
            geocoding_url: lookup("DASHBOARD_GEOCODING_URL")
                .unwrap_or_else(|| DEFAULT_NOMINATIM_URL.to_string()),
            geocoding_user_agent: lookup("DASHBOARD_USER_AGENT")
                .unwrap_or_else(|| "carburantes-dashboard".to_string()),
            default_radius_km: parsed(&lookup, "DASHBOARD_DEFAULT_RADIUS_KM", 5.0)?,
            default_limit: parsed(&lookup, "DASHBOARD_DEFAULT_LIMIT", 3)?,
            price_weight: parsed(&lookup, "DASHBOARD_PRICE_WEIGHT", 0.6)?,
            distance_weight: parsed(&lookup, "DASHBOARD_DISTANCE_WEIGHT", 0.4)?,
        })
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn table_dir(&self) -> PathBuf {
        self.data_dir.join("table")
    }

    pub fn metrics_dir(&self) -> PathBuf {
        self.data_dir.join("data-quality-metrics")
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = Config::from_lookup(|key| {
            (key == "DASHBOARD_DATA_DIR").then(|| "/tmp/carburantes".to_string())
        })
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/carburantes"));
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_radius_km, 5.0);
        assert_eq!(config.default_limit, 3);
        assert_eq!(config.price_weight, 0.6);
        assert_eq!(config.snapshot_dir(), PathBuf::from("/tmp/carburantes/snapshots"));
        assert_eq!(
            config.metrics_dir(),
            PathBuf::from("/tmp/carburantes/data-quality-metrics")
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(|key| match key {
            "DASHBOARD_DATA_DIR" => Some("/var/lib/fuel".to_string()),
            "DASHBOARD_CACHE_TTL" => Some("600".to_string()),
            "DASHBOARD_PORT" => Some("9090".to_string()),
            "DASHBOARD_PRICE_WEIGHT" => Some("0.8".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.cache_ttl_seconds, 600);
        assert_eq!(config.port, 9090);
        assert_eq!(config.price_weight, 0.8);
        assert_eq!(config.distance_weight, 0.4);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = Config::from_lookup(|key| match key {
            "DASHBOARD_DATA_DIR" => Some("/tmp/x".to_string()),
            "DASHBOARD_PORT" => Some("not-a-port".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

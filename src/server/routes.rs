//! Route handlers and response schemas for the dashboard API.

use crate::carburantes::Carburantes;
use crate::error::CarburantesError;
use crate::types::fuel::FuelType;
use crate::types::station::{StationPrice, TrendPeriod, TrendPoint, ZoneStats};
use crate::view::{
    station_summary, trend_kpis, zone_kpis, StationSummary, TrendKpis, ZoneKpis,
};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_LIMIT: usize = 20;
const MIN_RADIUS_KM: f64 = 0.1;
const MAX_RADIUS_KM: f64 = 50.0;

pub fn router(client: Arc<Carburantes>) -> Router {
    Router::new()
        .route("/api/v1/stations/cheapest-by-zip", get(cheapest_by_zip))
        .route("/api/v1/stations/nearest-by-address", get(nearest_by_address))
        .route(
            "/api/v1/stations/cheapest-by-address",
            get(cheapest_by_address),
        )
        .route("/api/v1/stations/best-by-address", get(best_by_address))
        .route("/api/v1/zones/cheapest", get(cheapest_zones))
        .route("/api/v1/trends/price", get(price_trend))
        .route("/health", get(health))
        .with_state(client)
}

/// API failure with the status it maps to. The body is always
/// `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Unavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<CarburantesError> for ApiError {
    fn from(err: CarburantesError) -> Self {
        match err {
            CarburantesError::AddressNotFound { address } => {
                ApiError::NotFound(format!("No location found for address '{address}'"))
            }
            CarburantesError::NoSnapshot => {
                ApiError::Unavailable("No snapshot loaded yet".to_string())
            }
            other => {
                error!("Request failed: {other}");
                ApiError::Internal
            }
        }
    }
}

fn validate_limit(limit: Option<usize>) -> Result<Option<usize>, ApiError> {
    match limit {
        Some(l) if !(1..=MAX_LIMIT).contains(&l) => Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        ))),
        other => Ok(other),
    }
}

fn validate_radius(radius_km: Option<f64>) -> Result<Option<f64>, ApiError> {
    match radius_km {
        Some(r) if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&r) => Err(ApiError::BadRequest(
            format!("radius_km must be between {MIN_RADIUS_KM} and {MAX_RADIUS_KM}"),
        )),
        other => Ok(other),
    }
}

#[derive(Serialize)]
pub struct StationListResponse {
    pub stations: Vec<StationPrice>,
    pub fuel_type: FuelType,
    pub query_type: &'static str,
    pub summary: Option<StationSummary>,
}

impl StationListResponse {
    fn new(
        stations: Vec<StationPrice>,
        fuel_type: FuelType,
        query_type: &'static str,
    ) -> Result<Self, ApiError> {
        if stations.is_empty() {
            return Err(ApiError::NotFound("No stations found".to_string()));
        }
        Ok(StationListResponse {
            summary: station_summary(&stations),
            stations,
            fuel_type,
            query_type,
        })
    }
}

#[derive(Serialize)]
pub struct ZoneListResponse {
    pub zones: Vec<ZoneStats>,
    pub province: String,
    pub fuel_type: FuelType,
    pub summary: Option<ZoneKpis>,
}

#[derive(Serialize)]
pub struct TrendResponse {
    pub trend: Vec<TrendPoint>,
    pub zip_code: String,
    pub fuel_type: FuelType,
    pub period: TrendPeriod,
    pub kpis: Option<TrendKpis>,
}

#[derive(Deserialize)]
struct ZipParams {
    zip_code: String,
    fuel_type: FuelType,
    limit: Option<usize>,
}

async fn cheapest_by_zip(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<ZipParams>,
) -> Result<Json<StationListResponse>, ApiError> {
    let limit = validate_limit(params.limit)?;
    let stations = client
        .cheapest_by_zip()
        .zip_code(&params.zip_code)
        .fuel(params.fuel_type)
        .maybe_limit(limit)
        .call()
        .await?;
    Ok(Json(StationListResponse::new(
        stations,
        params.fuel_type,
        "cheapest_by_zip",
    )?))
}

#[derive(Deserialize)]
struct AddressParams {
    address: String,
    fuel_type: FuelType,
    limit: Option<usize>,
}

async fn nearest_by_address(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<AddressParams>,
) -> Result<Json<StationListResponse>, ApiError> {
    let limit = validate_limit(params.limit)?;
    let stations = client
        .nearest_by_address()
        .address(&params.address)
        .fuel(params.fuel_type)
        .maybe_limit(limit)
        .call()
        .await?;
    Ok(Json(StationListResponse::new(
        stations,
        params.fuel_type,
        "nearest_by_address",
    )?))
}

#[derive(Deserialize)]
struct RadiusParams {
    address: String,
    fuel_type: FuelType,
    radius_km: Option<f64>,
    limit: Option<usize>,
}

async fn cheapest_by_address(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<RadiusParams>,
) -> Result<Json<StationListResponse>, ApiError> {
    let limit = validate_limit(params.limit)?;
    let radius_km = validate_radius(params.radius_km)?;
    let stations = client
        .cheapest_by_address()
        .address(&params.address)
        .fuel(params.fuel_type)
        .maybe_radius_km(radius_km)
        .maybe_limit(limit)
        .call()
        .await?;
    Ok(Json(StationListResponse::new(
        stations,
        params.fuel_type,
        "cheapest_by_address",
    )?))
}

async fn best_by_address(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<RadiusParams>,
) -> Result<Json<StationListResponse>, ApiError> {
    let limit = validate_limit(params.limit)?;
    let radius_km = validate_radius(params.radius_km)?;
    let stations = client
        .best_by_address()
        .address(&params.address)
        .fuel(params.fuel_type)
        .maybe_radius_km(radius_km)
        .maybe_limit(limit)
        .call()
        .await?;
    Ok(Json(StationListResponse::new(
        stations,
        params.fuel_type,
        "best_by_address",
    )?))
}

#[derive(Deserialize)]
struct ZoneParams {
    province: String,
    fuel_type: FuelType,
    limit: Option<usize>,
}

async fn cheapest_zones(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<ZoneParams>,
) -> Result<Json<ZoneListResponse>, ApiError> {
    let limit = validate_limit(params.limit)?;
    let zones = client
        .cheapest_zones()
        .province(&params.province)
        .fuel(params.fuel_type)
        .maybe_limit(limit)
        .call()
        .await?;
    if zones.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No zones found for province '{}'",
            params.province
        )));
    }
    Ok(Json(ZoneListResponse {
        summary: zone_kpis(&zones),
        zones,
        province: params.province,
        fuel_type: params.fuel_type,
    }))
}

#[derive(Deserialize)]
struct TrendParams {
    zip_code: String,
    fuel_type: FuelType,
    period: Option<TrendPeriod>,
}

async fn price_trend(
    State(client): State<Arc<Carburantes>>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendResponse>, ApiError> {
    let period = params.period.unwrap_or(TrendPeriod::Month);
    let trend = client
        .price_trend()
        .zip_code(&params.zip_code)
        .fuel(params.fuel_type)
        .period(period)
        .call()
        .await?;
    if trend.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No trend data for zip code '{}'",
            params.zip_code
        )));
    }
    Ok(Json(TrendResponse {
        kpis: trend_kpis(&trend),
        trend,
        zip_code: params.zip_code,
        fuel_type: params.fuel_type,
        period,
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

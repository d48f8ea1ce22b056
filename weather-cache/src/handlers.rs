use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::errors::AppError;
use common::models::{CacheStats, TemperatureUnit, WeatherResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

use crate::service::{RequestContext, WeatherService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-cache" }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    /// Caller identity used for the per-user cache
    pub user_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Unit for the `temperature` field; both units are always included
    #[serde(default)]
    pub units: TemperatureUnit,
}

impl WeatherQuery {
    fn validate(&self) -> Result<(), AppError> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::validation("lat must be between -90 and 90"));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(AppError::validation("lon must be between -180 and 180"));
        }
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Current weather near the coordinate", body = WeatherResponse),
        (status = 400, description = "Invalid user id or coordinate"),
        (status = 503, description = "No weather data available")
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, AppError> {
    query.validate()?;
    info!(user_id = %query.user_id, "Weather request received");

    let ctx = RequestContext::new(&query.user_id);
    let summary = state
        .service
        .get_weather(&ctx, &query.user_id, query.lat, query.lon)
        .await
        .ok_or_else(|| AppError::unavailable("No weather data available"))?;

    Ok(Json(WeatherResponse::new(query.user_id, summary, query.units)))
}

#[utoipa::path(
    delete,
    path = "/api/weather/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "User whose cached weather is dropped")
    ),
    responses(
        (status = 204, description = "User cache entry cleared")
    ),
    tag = "weather"
)]
pub async fn clear_user(State(state): State<AppState>, Path(user_id): Path<String>) -> StatusCode {
    info!(user_id = %user_id, "Clear user cache request received");
    state.service.clear_user(&user_id).await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/api/cache/stats",
    responses(
        (status = 200, description = "Cache occupancy", body = CacheStats)
    ),
    tag = "cache"
)]
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.stats().await)
}

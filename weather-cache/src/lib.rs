pub mod api_client;
pub mod bucket;
pub mod cache;
pub mod clock;
pub mod config;
pub mod distance;
pub mod handlers;
pub mod openapi;
pub mod service;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use service::{RequestContext, WeatherService};

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/weather/users/{user_id}", delete(handlers::clear_user))
        .route("/api/cache/stats", get(handlers::cache_stats))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

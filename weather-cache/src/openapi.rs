use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{CacheStats, TemperatureUnit, WeatherResponse, WeatherSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_weather,
        handlers::clear_user,
        handlers::cache_stats,
    ),
    components(schemas(WeatherSummary, WeatherResponse, TemperatureUnit, CacheStats)),
    tags(
        (name = "weather", description = "Proximity-cached weather lookups"),
        (name = "cache", description = "Cache diagnostics"),
    ),
)]
struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

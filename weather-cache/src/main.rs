use common::tracing::init as init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use weather_cache::api_client::{OpenWeatherMapClient, WeatherProvider};
use weather_cache::{WeatherService, config, handlers, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env();
    init_tracing(config.log_format);

    let provider = match config.openweather_api_key.clone() {
        Some(api_key) => Some(Arc::new(OpenWeatherMapClient::new(
            config.openweather_url.clone(),
            api_key,
            config.http_timeout_seconds,
        )) as Arc<dyn WeatherProvider>),
        None => {
            warn!("OPENWEATHER_API_KEY not set, weather lookups will only use cached data");
            None
        }
    };

    let service = Arc::new(WeatherService::with_system_clock(provider));
    let app = router(handlers::AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Weather cache starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Weather cache stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    warn!("Shutting down gracefully...");
}

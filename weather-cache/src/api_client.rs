use async_trait::async_trait;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::WeatherSummary;
use serde::Deserialize;
use tracing::{info, instrument};

pub const OPENWEATHERMAP_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Upstream source of current conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherSummary, AppError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMapResponse {
    weather: Vec<WeatherDescription>,
    main: MainWeather,
}

#[derive(Debug, Deserialize)]
struct WeatherDescription {
    main: String,
}

#[derive(Debug, Deserialize)]
struct MainWeather {
    temp: f64,
}

impl OpenWeatherMapResponse {
    fn into_summary(self) -> Result<WeatherSummary, AppError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.main)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::malformed("response has no weather condition"))?;

        if !self.main.temp.is_finite() {
            return Err(AppError::malformed("temperature is not a finite number"));
        }

        Ok(WeatherSummary::from_celsius(condition, self.main.temp))
    }
}

/// OpenWeatherMap "current weather" client. Always requests metric units.
pub struct OpenWeatherMapClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
        Self {
            http_client: HttpClient::new(timeout_secs),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherSummary, AppError> {
        info!("Fetching weather from API");

        let query = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let response: OpenWeatherMapResponse =
            self.http_client.get_json(&self.base_url, &query).await?;

        response.into_summary()
    }

    fn name(&self) -> &'static str {
        "OpenWeatherMap"
    }
}

use common::tracing::LogFormat;
use std::env;

use crate::api_client::OPENWEATHERMAP_BASE_URL;

pub struct Config {
    pub port: u16,
    pub openweather_url: String,
    /// `None` when unset or blank; the service then answers from cache only.
    pub openweather_api_key: Option<String>,
    pub http_timeout_seconds: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3002),
            openweather_url: env::var("OPENWEATHER_URL")
                .unwrap_or_else(|_| OPENWEATHERMAP_BASE_URL.to_string()),
            openweather_api_key: non_blank(env::var("OPENWEATHER_API_KEY").ok()),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            log_format: env::var("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" abc ".to_string())), Some("abc".to_string()));
    }
}

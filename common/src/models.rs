use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current conditions for a coordinate, temperature kept in whole degrees.
///
/// `temp_c` is canonical. `temp_f` is derived from the already rounded
/// Celsius value, so it can differ by one degree from a conversion of the
/// raw upstream reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub condition: String,
    pub temp_c: i32,
    pub temp_f: i32,
}

impl WeatherSummary {
    /// Build a summary from a raw Celsius reading.
    pub fn from_celsius(condition: impl Into<String>, raw_celsius: f64) -> Self {
        let temp_c = round_half_up(raw_celsius);
        let temp_f = round_half_up(f64::from(temp_c) * 9.0 / 5.0 + 32.0);
        Self {
            condition: condition.into(),
            temp_c,
            temp_f,
        }
    }

    pub fn temperature(&self, unit: TemperatureUnit) -> i32 {
        match unit {
            TemperatureUnit::Celsius => self.temp_c,
            TemperatureUnit::Fahrenheit => self.temp_f,
        }
    }
}

/// Rounds to the nearest integer, exact halves toward positive infinity.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Weather lookup response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub summary: WeatherSummary,
    pub temperature: i32,
    pub unit: TemperatureUnit,
    pub display: String,
}

impl WeatherResponse {
    pub fn new(user_id: String, summary: WeatherSummary, unit: TemperatureUnit) -> Self {
        let temperature = summary.temperature(unit);
        let display = format!("{} {}{}", summary.condition, temperature, unit.symbol());
        Self {
            user_id,
            summary,
            temperature,
            unit,
            display,
        }
    }
}

/// Occupancy of both cache tiers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheStats {
    pub shared_entries: usize,
    pub shared_capacity: usize,
    pub user_entries: usize,
}

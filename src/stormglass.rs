//! Marine-weather client and per-hour aggregation.
//!
//! One request fetches an hourly series for a fixed point; each hour
//! maps parameter name -> { source -> value }. For every parameter we
//! reduce the per-source values of each hour to a single number by
//! taking the element at `len / 2` of the sequence in payload order.
//! The sequence is NOT sorted first, so this is a positional pick, not
//! a true median; kept as-is deliberately. See DESIGN.md.

use std::time::Duration;

use chrono::Utc;
use poem_openapi::Object;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const STORMGLASS_URL: &str = "https://api.stormglass.io/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Hour indexes 0..=48 are aggregated, anything past that is dropped.
pub const FORECAST_HOURS: usize = 49;

pub const PARAMETERS: [&str; 9] = [
    "airTemperature",
    "waterTemperature",
    "windDirection",
    "windSpeed",
    "swellDirection",
    "swellHeight",
    "swellPeriod",
    "windWaveDirection",
    "currentDirection",
];

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("weather api answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("weather api payload was malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    pub hours: Vec<HourEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HourEntry {
    pub time: String,
    #[serde(flatten)]
    pub parameters: serde_json::Map<String, Value>,
}

/// Aggregated forecast. One series per parameter, holes where the
/// payload had no usable value for an hour.
#[derive(Debug)]
pub struct Forecast {
    pub hours: Vec<String>,
    pub series: Vec<ParameterSeries>,
}

#[derive(Debug, Object)]
pub struct ParameterSeries {
    pub parameter: String,
    pub values: Vec<Option<f64>>,
}

pub struct StormglassClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    lat: f64,
    lng: f64,
}

impl StormglassClient {
    pub fn new(api_key: String, lat: f64, lng: f64) -> Result<Self, WeatherError> {
        Self::with_base_url(STORMGLASS_URL.to_string(), api_key, lat, lng)
    }

    pub fn with_base_url(
        base_url: String,
        api_key: String,
        lat: f64,
        lng: f64,
    ) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            lat,
            lng,
        })
    }

    /// Fetches the hourly series for the window starting one hour from
    /// now and spanning 48 hours.
    pub async fn fetch_window(&self) -> Result<ForecastPayload, WeatherError> {
        let start = Utc::now() + chrono::Duration::hours(1);
        let end = start + chrono::Duration::hours(48);
        let response = self
            .http
            .get(format!("{}/weather/point", self.base_url))
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("lat", self.lat.to_string()),
                ("lng", self.lng.to_string()),
                ("params", PARAMETERS.join(",")),
                ("start", start.timestamp().to_string()),
                ("end", end.timestamp().to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn forecast(&self) -> Result<Forecast, WeatherError> {
        Ok(aggregate(&self.fetch_window().await?))
    }
}

pub fn aggregate(payload: &ForecastPayload) -> Forecast {
    let hours = payload
        .hours
        .iter()
        .take(FORECAST_HOURS)
        .map(|hour| hour.time.clone())
        .collect();
    let series = PARAMETERS
        .iter()
        .map(|parameter| ParameterSeries {
            parameter: (*parameter).to_string(),
            values: payload
                .hours
                .iter()
                .take(FORECAST_HOURS)
                .map(|hour| positional_median(&source_values(hour, parameter)))
                .collect(),
        })
        .collect();
    Forecast { hours, series }
}

/// Every source's value for `parameter` at this hour, in payload order.
fn source_values(hour: &HourEntry, parameter: &str) -> Vec<f64> {
    hour.parameters
        .get(parameter)
        .and_then(Value::as_object)
        .map(|sources| sources.values().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// The element at `len / 2` of an UNSORTED sequence. With an even
/// number of sources this is the upper of the two middle positions, and
/// with unordered input it need not be the statistical median at all.
fn positional_median(values: &[f64]) -> Option<f64> {
    values.get(values.len() / 2).copied()
}

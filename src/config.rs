use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::Context;
use tracing::info;

/// Runtime configuration, loaded once at startup. Secrets have no
/// defaults and missing ones abort the process with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub stormglass_api_key: String,
    pub forecast_lat: f64,
    pub forecast_lng: f64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: or_default("DATABASE_URL", "sqlite://tidelog.db?mode=rwc"),
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:3000"),
            jwt_secret: required("JWT_SECRET")?,
            stormglass_api_key: required("STORMGLASS_API_KEY")?,
            forecast_lat: parsed("FORECAST_LAT", "54.1767")?,
            forecast_lng: parsed("FORECAST_LNG", "12.0805")?,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            stormglass_api_key: "test-key".into(),
            forecast_lat: 54.1767,
            forecast_lng: 12.0805,
        }
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set in the environment"))
}

fn parsed<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = or_default(key, default);
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {key} value {raw:?}: {e}"))
}

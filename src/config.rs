use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::sources::yahoo::DEFAULT_BASE_URL;

/// Upper bound for `LOOKBACK_DAYS`; larger values fall back to the default.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Company name to ticker mapping (YAML).
    pub tickers_path: PathBuf,
    /// Pretrained classifier artifact (JSON).
    pub model_path: PathBuf,
    /// Fitted scaler artifact (JSON).
    pub scaler_path: PathBuf,
    /// Calendar days of history requested per prediction, at most [`MAX_LOOKBACK_DAYS`].
    pub lookback_days: u32,
    /// Upstream request timeout.
    pub fetch_timeout: Duration,
    /// Yahoo Finance API base URL.
    pub yahoo_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            tickers_path: lookup("TICKERS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tickers_path),
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            scaler_path: lookup("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scaler_path),
            lookback_days: lookup("LOOKBACK_DAYS")
                .and_then(|v| v.parse().ok())
                .filter(|days: &u32| (1..=MAX_LOOKBACK_DAYS).contains(days))
                .unwrap_or(defaults.lookback_days),
            fetch_timeout: lookup("FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            yahoo_base_url: lookup("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
        }
    }

    fn defaults() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            tickers_path: PathBuf::from("/app/stocks.yaml"),
            model_path: PathBuf::from("/app/model.json"),
            scaler_path: PathBuf::from("/app/scaler.json"),
            lookback_days: 30,
            fetch_timeout: Duration::from_secs(30),
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

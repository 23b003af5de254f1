//! Market data sources.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::types::OhlcvSeries;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use thiserror::Error;

/// Failure talking to an upstream data provider.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Yahoo API error: {code} - {description}")]
    Api { code: String, description: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Date window for a daily-bar request. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// Window of `days` calendar days ending at the date of `now`.
    /// `None` when the start would fall outside the representable date range.
    pub fn trailing(days: u32, now: DateTime<Utc>) -> Option<Self> {
        let end = now.date_naive();
        let start = end.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self { start, end })
    }

    /// Unix seconds of the window start at 00:00 UTC.
    pub fn start_timestamp(&self) -> i64 {
        self.start.and_hms_opt(0, 0, 0).map(|d| d.and_utc().timestamp()).unwrap_or_default()
    }

    /// Unix seconds of the window end at 00:00 UTC.
    pub fn end_timestamp(&self) -> i64 {
        self.end.and_hms_opt(0, 0, 0).map(|d| d.and_utc().timestamp()).unwrap_or_default()
    }
}

/// Provider of daily OHLCV bars.
///
/// An unknown symbol or a window without trading days yields an empty series,
/// not an error.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` inside `window`.
    async fn daily_bars(&self, symbol: &str, window: FetchWindow) -> Result<OhlcvSeries, SourceError>;
}

//! Yahoo Finance API client for daily stock data.
//!
//! Uses the unofficial chart API with unadjusted prices.

use super::{FetchWindow, MarketDataSource, SourceError};
use crate::types::{OhlcvBar, OhlcvSeries};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    symbol: String,
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, window: FetchWindow) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includePrePost=false",
            self.base_url,
            symbol,
            window.start_timestamp(),
            window.end_timestamp()
        )
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn daily_bars(&self, symbol: &str, window: FetchWindow) -> Result<OhlcvSeries, SourceError> {
        let url = self.chart_url(symbol, window);
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Unknown symbols come back as 404 with a chart error body
        let data: YahooChartResponse = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(_) if !status.is_success() => return Err(SourceError::Status(status)),
            Err(e) => return Err(SourceError::Parse(e.to_string())),
        };

        if !status.is_success() && status != StatusCode::NOT_FOUND && data.chart.error.is_none() {
            return Err(SourceError::Status(status));
        }

        parse_chart(data, symbol)
    }
}

/// Turn a chart response into an ordered series, skipping incomplete bars.
fn parse_chart(data: YahooChartResponse, symbol: &str) -> Result<OhlcvSeries, SourceError> {
    if let Some(error) = data.chart.error {
        if error.code == "Not Found" {
            warn!("Yahoo has no data for {}: {}", symbol, error.description);
            return Ok(OhlcvSeries::empty(symbol));
        }
        return Err(SourceError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(OhlcvSeries::empty(symbol));
    };

    // No trading days in the window
    let Some(timestamps) = result.timestamp else {
        return Ok(OhlcvSeries::empty(result.meta.symbol));
    };

    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(SourceError::Parse("No quote data in response".to_string()));
    };

    let offset = result.meta.gmtoffset.unwrap_or(0);
    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            value_at(&opens, i),
            value_at(&highs, i),
            value_at(&lows, i),
            value_at(&closes, i),
            volumes.get(i).copied().flatten(),
        ) else {
            continue;
        };

        if close <= 0.0 {
            continue;
        }

        let Some(date) = DateTime::from_timestamp(timestamp + offset, 0).map(|d| d.date_naive())
        else {
            continue;
        };

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume: volume as f64,
        });
    }

    Ok(OhlcvSeries::new(result.meta.symbol, bars))
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

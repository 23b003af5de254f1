//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockcast::services::{Metrics, PredictionService, SequenceClassifier, StandardScaler, TickerRegistry};
use stockcast::sources::{FetchWindow, MarketDataSource, SourceError};
use stockcast::types::{OhlcvBar, OhlcvSeries};
use stockcast::AppState;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Daily bars starting 2024-01-01 around the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + Duration::days(i as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.5,
            close,
            volume: 1_000_000.0 + i as f64 * 10_000.0,
        })
        .collect()
}

pub fn rising_closes() -> Vec<f64> {
    (0..30).map(|i| 100.0 + i as f64 * 1.2).collect()
}

pub fn falling_closes() -> Vec<f64> {
    (0..30).map(|i| 160.0 - i as f64 * 1.2).collect()
}

/// In-memory data source serving the same bars for every symbol.
pub struct StubSource {
    bars: Vec<OhlcvBar>,
    error: Option<String>,
    panics: bool,
    calls: AtomicUsize,
    symbols: std::sync::Mutex<Vec<String>>,
}

impl StubSource {
    pub fn with_closes(closes: &[f64]) -> Arc<Self> {
        Arc::new(Self {
            bars: bars_from_closes(closes),
            error: None,
            panics: false,
            calls: AtomicUsize::new(0),
            symbols: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            bars: Vec::new(),
            error: Some(message.to_string()),
            panics: false,
            calls: AtomicUsize::new(0),
            symbols: std::sync::Mutex::new(Vec::new()),
        })
    }

    /// Source whose fetch panics, standing in for any bug inside a handler.
    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            bars: Vec::new(),
            error: None,
            panics: true,
            calls: AtomicUsize::new(0),
            symbols: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.symbols.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn daily_bars(&self, symbol: &str, _window: FetchWindow) -> Result<OhlcvSeries, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.symbols.lock().unwrap().push(symbol.to_string());
        if self.panics {
            panic!("bar decoder exploded for {}", symbol);
        }
        match &self.error {
            Some(message) => Err(SourceError::Parse(message.clone())),
            None => Ok(OhlcvSeries::new(symbol, self.bars.clone())),
        }
    }
}

pub fn test_state(source: Arc<StubSource>) -> AppState {
    let predictor = PredictionService::new(
        TickerRegistry::load(fixture("stocks.yaml")).unwrap(),
        source,
        StandardScaler::load(fixture("scaler.json")).unwrap(),
        SequenceClassifier::load(fixture("model.json")).unwrap(),
        30,
    );

    AppState {
        predictor: Arc::new(predictor),
        metrics: Metrics::new().unwrap(),
    }
}

//! Prediction pipeline: lookup → fetch → featurize → scale → infer.

use super::classifier::{ModelError, SequenceClassifier};
use super::features::{latest_feature_vector, FeatureError};
use super::registry::TickerRegistry;
use super::scaler::StandardScaler;
use crate::error::AppError;
use crate::sources::{FetchWindow, MarketDataSource, SourceError};
use crate::types::PredictionResult;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable context shared by every prediction request.
pub struct PredictionService {
    registry: TickerRegistry,
    source: Arc<dyn MarketDataSource>,
    scaler: StandardScaler,
    model: SequenceClassifier,
    lookback_days: u32,
}

impl PredictionService {
    pub fn new(
        registry: TickerRegistry,
        source: Arc<dyn MarketDataSource>,
        scaler: StandardScaler,
        model: SequenceClassifier,
        lookback_days: u32,
    ) -> Self {
        Self {
            registry,
            source,
            scaler,
            model,
            lookback_days,
        }
    }

    /// Run the full pipeline for one company.
    pub async fn predict(&self, company_name: &str) -> Result<PredictionResult, AppError> {
        if company_name.trim().is_empty() {
            return Err(AppError::BadRequest("company_name must not be empty".to_string()));
        }

        let ticker = self.registry.lookup(company_name).ok_or_else(|| {
            AppError::NotFound(format!("Company {} not found in ticker registry", company_name))
        })?;

        let window = FetchWindow::trailing(self.lookback_days, Utc::now()).ok_or_else(|| {
            AppError::Internal(format!("lookback of {} days is out of range", self.lookback_days))
        })?;
        info!(
            "Downloading {} ({}) from {} to {} via {}",
            company_name,
            ticker,
            window.start,
            window.end,
            self.source.name()
        );
        let series = self
            .source
            .daily_bars(ticker, window)
            .await
            .map_err(|e| upstream_error(company_name, e))?;
        debug!("Fetched {} bars for {}", series.len(), ticker);

        let features = latest_feature_vector(&series).map_err(|e| match e {
            FeatureError::InsufficientData { rows, required } => {
                warn!(
                    "Insufficient data for {}: {} bars, need at least {}",
                    company_name, rows, required
                );
                AppError::InsufficientData(format!("insufficient data for company {}", company_name))
            }
        })?;
        debug!("Feature vector for {} as of {}: {:?}", ticker, features.date, features.values());

        let scaled = self.scaler.transform(&features);
        let class = self
            .model
            .predict(&scaled)
            .map_err(|e| inference_error(company_name, e))?;

        let prediction = u8::try_from(class)
            .map_err(|_| AppError::Internal(format!("class index {} out of range", class)))?;

        info!("Predicted {} for {}", prediction, company_name);
        Ok(PredictionResult {
            company_name: company_name.to_string(),
            prediction,
        })
    }
}

fn upstream_error(company_name: &str, e: SourceError) -> AppError {
    AppError::ExternalApi(format!("fetching data for {}: {}", company_name, e))
}

fn inference_error(company_name: &str, e: ModelError) -> AppError {
    AppError::Inference(format!("predicting {}: {}", company_name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OhlcvBar, OhlcvSeries};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        closes: Vec<f64>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubSource {
        fn new(closes: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                closes,
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                closes: Vec::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn daily_bars(&self, symbol: &str, _window: FetchWindow) -> Result<OhlcvSeries, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::Parse("upstream unavailable".to_string()));
            }
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let bars = self
                .closes
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
                .collect();
            Ok(OhlcvSeries::new(symbol, bars))
        }
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn service(source: Arc<StubSource>) -> PredictionService {
        service_with_lookback(source, 30)
    }

    fn service_with_lookback(source: Arc<StubSource>, lookback_days: u32) -> PredictionService {
        let mut tickers = BTreeMap::new();
        tickers.insert("Acme".to_string(), "ACME.NS".to_string());
        PredictionService::new(
            TickerRegistry::from_map(tickers),
            source,
            StandardScaler::load(fixture("scaler.json")).unwrap(),
            SequenceClassifier::load(fixture("model.json")).unwrap(),
            lookback_days,
        )
    }

    fn rising() -> Vec<f64> {
        (0..30).map(|i| 100.0 + i as f64 * 1.2).collect()
    }

    fn falling() -> Vec<f64> {
        (0..30).map(|i| 160.0 - i as f64 * 1.2).collect()
    }

    #[tokio::test]
    async fn test_rising_series_predicts_up() {
        let source = StubSource::new(rising());
        let result = service(source.clone()).predict("Acme").await.unwrap();
        assert_eq!(
            result,
            PredictionResult {
                company_name: "Acme".to_string(),
                prediction: 1,
            }
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_falling_series_predicts_down() {
        let result = service(StubSource::new(falling())).predict("Acme").await.unwrap();
        assert_eq!(result.prediction, 0);
    }

    #[tokio::test]
    async fn test_repeated_predictions_are_identical() {
        let service = service(StubSource::new(rising()));
        let first = service.predict("Acme").await.unwrap();
        for _ in 0..3 {
            assert_eq!(service.predict("Acme").await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_unknown_company_skips_fetch() {
        let source = StubSource::new(rising());
        let err = service(source.clone()).predict("Umbrella").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Company Umbrella not found in ticker registry"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let err = service(StubSource::new(rising())).predict("acme").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_name_is_bad_request() {
        let source = StubSource::new(rising());
        let err = service(source.clone()).predict("   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_series_is_insufficient() {
        let closes = rising().into_iter().take(10).collect();
        let err = service(StubSource::new(closes)).predict("Acme").await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(ref msg) if msg == "insufficient data for company Acme"));
    }

    #[tokio::test]
    async fn test_empty_series_is_insufficient() {
        let err = service(StubSource::new(Vec::new())).predict("Acme").await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_external_error() {
        let err = service(StubSource::failing()).predict("Acme").await.unwrap_err();
        match err {
            AppError::ExternalApi(msg) => assert!(msg.contains("upstream unavailable")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unrepresentable_lookback_is_internal_error() {
        let source = StubSource::new(rising());
        let err = service_with_lookback(source.clone(), u32::MAX)
            .predict("Acme")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(ref msg) if msg.contains("out of range")));
        assert_eq!(source.calls(), 0);
    }
}

//! Feature engineering: indicator frame and the model's feature vector.
//!
//! The column order of [`Feature::ALL`] is the order the scaler and the
//! classifier were fitted on. Artifacts carrying feature names are checked
//! against it at load time.

use super::indicators::{Indicator, Macd, Rsi, Sma};
use crate::types::{OhlcvBar, OhlcvSeries};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 9;

/// Shortest series that can yield a feature vector (RSI needs 14 deltas).
pub const MIN_BARS: usize = 15;

/// Named model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Open,
    High,
    Low,
    Close,
    Volume,
    Sma5,
    Sma10,
    Rsi,
    Macd,
}

impl Feature {
    /// Schema order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Open,
        Feature::High,
        Feature::Low,
        Feature::Close,
        Feature::Volume,
        Feature::Sma5,
        Feature::Sma10,
        Feature::Rsi,
        Feature::Macd,
    ];

    /// Column name used in fitted artifacts.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Open => "Open",
            Feature::High => "High",
            Feature::Low => "Low",
            Feature::Close => "Close",
            Feature::Volume => "Volume",
            Feature::Sma5 => "SMA_5",
            Feature::Sma10 => "SMA_10",
            Feature::Rsi => "RSI",
            Feature::Macd => "MACD",
        }
    }

    /// Position in schema order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Indicator computing this column from closes; `None` for raw bar fields.
    pub fn indicator(&self) -> Option<Box<dyn Indicator>> {
        match self {
            Feature::Sma5 => Some(Box::new(Sma::new(5))),
            Feature::Sma10 => Some(Box::new(Sma::new(10))),
            Feature::Rsi => Some(Box::new(Rsi::default())),
            Feature::Macd => Some(Box::new(Macd::default())),
            Feature::Open | Feature::High | Feature::Low | Feature::Close | Feature::Volume => None,
        }
    }

    /// Column names in schema order.
    pub fn names() -> [&'static str; FEATURE_COUNT] {
        Feature::ALL.map(|f| f.name())
    }
}

/// Check that `names` matches the schema exactly, in order.
pub fn check_schema(names: &[String]) -> Result<(), SchemaMismatch> {
    let expected = Feature::names();
    let matches = names.len() == expected.len()
        && names.iter().zip(expected.iter()).all(|(a, b)| a == b);

    if matches {
        Ok(())
    } else {
        Err(SchemaMismatch {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            actual: names.to_vec(),
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("feature columns {actual:?} do not match {expected:?}")]
pub struct SchemaMismatch {
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("no fully computable row in {rows} bars (need at least {required})")]
    InsufficientData { rows: usize, required: usize },
}

/// One bar's feature columns in schema order. `None` marks indicator warm-up rows.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub values: [Option<f64>; FEATURE_COUNT],
}

impl IndicatorRow {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values[feature.index()]
    }
}

/// Model input in schema order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub date: NaiveDate,
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Select the feature columns of a row. `None` if any is undefined or not finite.
    pub fn from_row(row: &IndicatorRow) -> Option<Self> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, value) in values.iter_mut().zip(row.values) {
            *slot = value.filter(|v| v.is_finite())?;
        }
        Some(Self {
            date: row.date,
            values,
        })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }
}

/// Compute SMA(5), SMA(10), RSI(14) and MACD(12, 26) for every bar.
pub fn indicator_frame(series: &OhlcvSeries) -> Vec<IndicatorRow> {
    let bars = series.bars();
    let closes = series.closes();

    let columns: Vec<Vec<Option<f64>>> = Feature::ALL
        .iter()
        .map(|feature| match feature.indicator() {
            Some(indicator) => indicator.compute(&closes),
            None => bars.iter().map(|bar| raw_value(*feature, bar)).collect(),
        })
        .collect();

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut values = [None; FEATURE_COUNT];
            for (slot, column) in values.iter_mut().zip(&columns) {
                *slot = column[i];
            }
            IndicatorRow {
                date: bar.date,
                values,
            }
        })
        .collect()
}

fn raw_value(feature: Feature, bar: &OhlcvBar) -> Option<f64> {
    match feature {
        Feature::Open => Some(bar.open),
        Feature::High => Some(bar.high),
        Feature::Low => Some(bar.low),
        Feature::Close => Some(bar.close),
        Feature::Volume => Some(bar.volume),
        Feature::Sma5 | Feature::Sma10 | Feature::Rsi | Feature::Macd => None,
    }
}

/// Feature vector of the most recent fully computable row.
pub fn latest_feature_vector(series: &OhlcvSeries) -> Result<FeatureVector, FeatureError> {
    let frame = indicator_frame(series);
    let complete: Vec<FeatureVector> = frame.iter().filter_map(FeatureVector::from_row).collect();

    debug!(
        "Computed indicators for {}: {} rows, {} complete",
        series.symbol,
        frame.len(),
        complete.len()
    );

    complete.last().copied().ok_or(FeatureError::InsufficientData {
        rows: series.len(),
        required: MIN_BARS,
    })
}

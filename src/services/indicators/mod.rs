//! Technical indicator implementations over close prices.
//!
//! Each indicator yields one value per input row; `None` marks rows where the
//! indicator is not yet defined.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for series indicators.
pub trait Indicator: Send + Sync {
    /// Column name of the indicator output.
    fn name(&self) -> &str;

    /// Number of rows needed before the first defined value.
    fn min_periods(&self) -> usize;

    /// Compute the indicator for every row of `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

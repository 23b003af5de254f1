//! Exponential Moving Average (EMA) indicator.

use super::Indicator;

/// EMA (Exponential Moving Average) indicator.
///
/// Recursive smoothing with `alpha = 2 / (period + 1)`, seeded with the first
/// close and without bias adjustment, so every row is defined.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// EMA of every value in `values`.
    pub fn series(&self, values: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(values.len());
        let mut iter = values.iter();

        let Some(&first) = iter.next() else {
            return out;
        };

        let mut ema = first;
        out.push(ema);
        for &value in iter {
            ema = alpha * value + (1.0 - alpha) * ema;
            out.push(ema);
        }
        out
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "EMA"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        self.series(closes).into_iter().map(Some).collect()
    }
}

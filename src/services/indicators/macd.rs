//! MACD (Moving Average Convergence Divergence) indicator.

use super::{Ema, Indicator};

/// MACD line: EMA(fast) - EMA(slow) of close.
pub struct Macd {
    fast: Ema,
    slow: Ema,
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26)
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "MACD"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        self.fast
            .series(closes)
            .into_iter()
            .zip(self.slow.series(closes))
            .map(|(fast, slow)| Some(fast - slow))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_macd_constant_series_is_zero() {
        let values = Macd::default().compute(&[250.0; 30]);
        assert_eq!(values.len(), 30);
        for value in values {
            assert_abs_diff_eq!(value.unwrap(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let values = Macd::default().compute(&closes);
        assert_abs_diff_eq!(values[0].unwrap(), 0.0);
        assert!(values[29].unwrap() > 0.0);
    }

    #[test]
    fn test_macd_downtrend_negative() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let values = Macd::default().compute(&closes);
        assert!(values[29].unwrap() < 0.0);
    }
}

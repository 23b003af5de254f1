//! Relative Strength Index (RSI) indicator.

use super::Indicator;

/// RSI (Relative Strength Index) indicator.
///
/// Close deltas are split into gains and losses, each averaged over a rolling
/// window of `period` deltas:
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`.
///
/// The first defined row is index `period`. A window without losses is 100,
/// a window without any movement is 50.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                return 50.0;
            }
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "RSI"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if self.period == 0 || closes.len() < self.min_periods() {
            return out;
        }

        // deltas[j] is the change into row j + 1
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        for (row, slot) in out.iter_mut().enumerate().skip(self.period) {
            let window = &deltas[row - self.period..row];
            let avg_gain = window.iter().map(|d| d.max(0.0)).sum::<f64>() / self.period as f64;
            let avg_loss = window.iter().map(|d| (-d).max(0.0)).sum::<f64>() / self.period as f64;
            *slot = Some(Self::from_averages(avg_gain, avg_loss));
        }

        out
    }
}

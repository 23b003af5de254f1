//! Simple Moving Average (SMA) indicator.

use super::Indicator;

/// SMA (Simple Moving Average) indicator.
///
/// Mean close over a trailing window, defined once the window is full.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        match self.period {
            5 => "SMA_5",
            10 => "SMA_10",
            _ => "SMA",
        }
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        if self.period == 0 {
            return vec![None; closes.len()];
        }

        (0..closes.len())
            .map(|i| {
                if i + 1 < self.period {
                    return None;
                }
                let window = &closes[i + 1 - self.period..=i];
                Some(window.iter().sum::<f64>() / self.period as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_names() {
        assert_eq!(Sma::new(5).name(), "SMA_5");
        assert_eq!(Sma::new(10).name(), "SMA_10");
        assert_eq!(Sma::new(7).name(), "SMA");
    }

    #[test]
    fn test_sma_warmup_rows_undefined() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let values = Sma::new(5).compute(&closes);
        assert_eq!(values.len(), 6);
        assert!(values[..4].iter().all(Option::is_none));
        assert_relative_eq!(values[4].unwrap(), 3.0);
        assert_relative_eq!(values[5].unwrap(), 4.0);
    }

    #[test]
    fn test_sma_short_series() {
        let values = Sma::new(10).compute(&[1.0, 2.0, 3.0]);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn test_sma_empty() {
        assert!(Sma::new(5).compute(&[]).is_empty());
    }
}

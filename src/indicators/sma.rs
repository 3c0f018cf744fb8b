// =============================================================================
// Simple Moving Average and rolling window helpers
// =============================================================================
//
// SMA_t = mean(values[t - period + 1 ..= t])
//
// The rolling helpers in this file are shared by Bollinger Bands, Stochastic,
// the key-level calculation and realized volatility.
// =============================================================================

/// Compute the SMA series for `values` and look-back `period`.
///
/// The output is aligned with the input: the first `period - 1` entries are
/// `None`.  `period == 0` yields an all-`None` vector.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let period_f = period as f64;
    let mut window_sum: f64 = values[..period].iter().sum();
    out[period - 1] = finite(window_sum / period_f);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out[i] = finite(window_sum / period_f);
    }

    out
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `None` for fewer than two values or a non-finite result.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    finite(variance.sqrt())
}

/// Highest value among the last `window` elements (or all of them, if fewer).
pub fn rolling_max(values: &[f64], window: usize) -> Option<f64> {
    tail(values, window).iter().copied().reduce(f64::max)
}

/// Lowest value among the last `window` elements (or all of them, if fewer).
pub fn rolling_min(values: &[f64], window: usize) -> Option<f64> {
    tail(values, window).iter().copied().reduce(f64::min)
}

fn tail(values: &[f64], window: usize) -> &[f64] {
    &values[values.len().saturating_sub(window)..]
}

pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sma_known_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);
        assert_eq!(out.len(), 5);
        assert!(out[0].is_none());
        assert!(out[1].is_none());
        assert!((out[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((out[4].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_zero_or_too_long() {
        assert!(sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
        assert!(sma(&[1.0, 2.0], 5).iter().all(Option::is_none));
        assert!(sma(&[], 5).is_empty());
    }

    #[test]
    fn sample_std_matches_hand_calculation() {
        // mean 5, squared deviations sum 32, n-1 = 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std(&values).unwrap();
        assert!((std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn rolling_extremes_use_tail_only() {
        let values = [10.0, 1.0, 3.0, 2.0];
        assert_eq!(rolling_max(&values, 3), Some(3.0));
        assert_eq!(rolling_min(&values, 2), Some(2.0));
        assert_eq!(rolling_max(&values, 100), Some(10.0));
        assert_eq!(rolling_max(&[], 3), None);
    }

    proptest! {
        #[test]
        fn sma_of_constant_series_is_constant(price in 0.5f64..500.0, len in 200usize..260, period in 1usize..200) {
            let values = vec![price; len];
            let out = sma(&values, period);
            prop_assert_eq!(out.len(), len);
            for v in out.iter().skip(period - 1) {
                prop_assert!((v.unwrap() - price).abs() < 1e-9);
            }
        }
    }
}

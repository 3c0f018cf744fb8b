// =============================================================================
// Stochastic Oscillator
// =============================================================================
//
//   %K = 100 * (close - lowest_low(period)) / (highest_high(period) - lowest_low(period))
//   %D = SMA(%K, 3)
//
// %K is undefined when the window has no range; %D is undefined when any %K
// in its 3-bar window is undefined.

const D_PERIOD: usize = 3;

/// Aligned %K / %D series.
#[derive(Debug, Clone, Default)]
pub struct Stochastic {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

impl Stochastic {
    pub fn latest_k(&self) -> Option<f64> {
        super::latest(&self.k)
    }

    pub fn latest_d(&self) -> Option<f64> {
        super::latest(&self.d)
    }
}

/// Compute the stochastic oscillator.  The three slices must be the same
/// length; extra elements in longer slices are ignored.
pub fn stochastic(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Stochastic {
    let n = high.len().min(low.len()).min(close.len());
    let mut k = vec![None; n];

    if period > 0 && n >= period {
        for i in (period - 1)..n {
            let window = (i + 1 - period)..=i;
            let highest = high[window.clone()].iter().copied().fold(f64::MIN, f64::max);
            let lowest = low[window].iter().copied().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range > 0.0 {
                let value = 100.0 * (close[i] - lowest) / range;
                k[i] = value.is_finite().then_some(value);
            }
        }
    }

    let mut d = vec![None; n];
    if n >= D_PERIOD {
        for i in (D_PERIOD - 1)..n {
            let window = &k[(i + 1 - D_PERIOD)..=i];
            if let Some(sum) = window.iter().copied().sum::<Option<f64>>() {
                d[i] = Some(sum / D_PERIOD as f64);
            }
        }
    }

    Stochastic { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_at_high_is_100() {
        let high: Vec<f64> = (0..20).map(|i| 101.0 + i as f64).collect();
        let low: Vec<f64> = (0..20).map(|i| 99.0 + i as f64).collect();
        let close = high.clone();
        let st = stochastic(&high, &low, &close, 14);
        assert!((st.latest_k().unwrap() - 100.0).abs() < 1e-10);
        assert!((st.latest_d().unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn flat_window_is_undefined() {
        let flat = vec![100.0; 20];
        let st = stochastic(&flat, &flat, &flat, 14);
        assert!(st.latest_k().is_none());
        assert!(st.latest_d().is_none());
    }

    #[test]
    fn insufficient_history() {
        let st = stochastic(&[1.0, 2.0], &[0.5, 1.5], &[1.0, 2.0], 14);
        assert_eq!(st.k.len(), 2);
        assert!(st.k.iter().all(Option::is_none));
    }

    #[test]
    fn k_in_range() {
        let close: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let st = stochastic(&high, &low, &close, 14);
        for v in st.k.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }
}

// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded by the first value with no bias adjustment, so the
// output is defined for every bar and has the same length as the input.
// =============================================================================

/// Compute the EMA series for `values` and look-back `period`.
///
/// Returns an empty `Vec` for empty input or `period == 0`.
///
/// # Edge cases
/// - A non-finite input poisons every later value; consumers see the
///   non-finite tail and treat it as undefined.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &value in &values[1..] {
        prev = value * multiplier + prev * (1.0 - multiplier);
        result.push(prev);
    }

    result
}

/// Most recent EMA value, `None` when the input is empty or the value is not
/// finite.
pub fn latest_ema(values: &[f64], period: usize) -> Option<f64> {
    ema(values, period)
        .last()
        .copied()
        .filter(|v| v.is_finite())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_seeded_by_first_value() {
        let out = ema(&[4.0, 4.0, 4.0], 10);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ema_known_values() {
        // period 3 => multiplier 0.5
        let out = ema(&[2.0, 4.0, 8.0], 3);
        assert!((out[1] - 3.0).abs() < 1e-12);
        assert!((out[2] - 5.5).abs() < 1e-12);
    }

    #[test]
    fn ema_shorter_than_period_is_still_defined() {
        let out = ema(&[1.0, 2.0], 200);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn latest_ema_rejects_nan() {
        assert!(latest_ema(&[1.0, f64::NAN], 3).is_none());
        assert!(latest_ema(&[], 3).is_none());
    }

    #[test]
    fn rising_series_keeps_fast_above_slow() {
        let closes: Vec<f64> = (1..=300).map(|x| x as f64).collect();
        let fast = latest_ema(&closes, 50).unwrap();
        let slow = latest_ema(&closes, 200).unwrap();
        assert!(fast > slow);
    }

    proptest! {
        #[test]
        fn ema_of_constant_series_is_constant(price in 0.5f64..500.0, len in 200usize..260, period in 1usize..250) {
            let values = vec![price; len];
            let out = ema(&values, period);
            prop_assert_eq!(out.len(), len);
            for v in out {
                prop_assert!((v - price).abs() < 1e-9);
            }
        }
    }
}

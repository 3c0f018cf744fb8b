// =============================================================================
// True Range and Average True Range (ATR)
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR_0 = H - L                        (no previous close)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the Wilder-style exponential average of TR, seeded by the first TR:
//   ATR_0 = TR_0
//   ATR_t = ATR_{t-1} + (TR_t - ATR_{t-1}) / period
//
// Default period: 14
// =============================================================================

use crate::market_data::Candle;

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// True range per bar, aligned with `candles`.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(prev_close) => hl
                    .max((c.high - prev_close).abs())
                    .max((c.low - prev_close).abs()),
                None => hl,
            }
        })
        .collect()
}

/// ATR series aligned with `candles`.
///
/// Returns an empty `Vec` for empty input or `period == 0`.  Values after a
/// non-finite TR are non-finite as well.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.is_empty() {
        return Vec::new();
    }

    let alpha = 1.0 / period as f64;
    let tr = true_range(candles);
    let mut out = Vec::with_capacity(tr.len());
    let mut prev = tr[0];
    out.push(prev);
    for &value in &tr[1..] {
        prev = prev + alpha * (value - prev);
        out.push(prev);
    }
    out
}

/// Most recent ATR value.
///
/// Returns `None` when the input is empty, `period` is zero, or the value is
/// non-finite.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    atr_series(candles, period)
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
    use crate::market_data::candle::test_candle as candle;

    #[test]
    fn atr_period_zero() {
        let candles = vec![candle(100.0, 105.0, 95.0, 102.0); 20];
        assert!(atr(&candles, 0).is_none());
    }

    #[test]
    fn atr_empty() {
        assert!(atr(&[], 14).is_none());
        assert!(true_range(&[]).is_empty());
    }

    #[test]
    fn first_true_range_is_bar_range() {
        let candles = vec![candle(100.0, 103.0, 99.0, 101.0)];
        assert_eq!(true_range(&candles), vec![4.0]);
        assert_eq!(atr(&candles, 14), Some(4.0));
    }

    #[test]
    fn true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L
        let candles = vec![
            candle(100.0, 105.0, 95.0, 95.0),
            candle(110.0, 115.0, 108.0, 112.0),
        ];
        let tr = true_range(&candles);
        assert!((tr[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn atr_constant_range_stays_constant() {
        let candles: Vec<Candle> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                candle(base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let value = atr(&candles, 14).unwrap();
        assert!((value - 10.0).abs() < 0.2, "expected ATR near 10, got {value}");
    }

    #[test]
    fn atr_wilder_step() {
        let candles = vec![
            candle(100.0, 102.0, 98.0, 100.0), // TR 4
            candle(100.0, 106.0, 98.0, 104.0), // TR 8
        ];
        // 4 + (8 - 4) / 4 = 5
        assert!((atr(&candles, 4).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn atr_nan_returns_none() {
        let candles = vec![
            candle(100.0, 105.0, 95.0, 100.0),
            candle(100.0, f64::NAN, f64::NAN, 100.0),
            candle(100.0, 105.0, 95.0, 100.0),
        ];
        assert!(atr(&candles, 3).is_none());
    }
}

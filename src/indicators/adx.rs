// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Sum +DM, -DM and TR over the trailing `period` bars.
//   4. Derive +DI = sum(+DM) / sum(TR) * 100
//            -DI = sum(-DM) / sum(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = simple rolling mean of DX over `period` bars.
//
// Interpretation:
//   ADX >= 20 => trending market (TFQE trend filter)
//   ADX <  20 => ranging / choppy market
// =============================================================================

use super::atr::true_range;
use crate::market_data::Candle;

pub const DEFAULT_ADX_PERIOD: usize = 14;

/// ADX series aligned with `candles`.
///
/// The first defined value sits at index `2 * period - 2`.  A bar is `None`
/// when its DX window contains an undefined DX (no directional movement or
/// zero true range).
pub fn adx_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let n = candles.len();
    let mut out = vec![None; n];
    if period == 0 || n + 1 < 2 * period {
        return out;
    }

    // ------------------------------------------------------------------
    // Step 1 & 2: raw +DM, -DM and True Range
    // ------------------------------------------------------------------
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }
    let tr = true_range(candles);

    // ------------------------------------------------------------------
    // Step 3-5: rolling sums -> DI -> DX
    // ------------------------------------------------------------------
    let mut dx: Vec<Option<f64>> = vec![None; n];
    for i in (period - 1)..n {
        let window = (i + 1 - period)..=i;
        let tr_sum: f64 = tr[window.clone()].iter().sum();
        let plus_sum: f64 = plus_dm[window.clone()].iter().sum();
        let minus_sum: f64 = minus_dm[window].iter().sum();
        dx[i] = compute_dx(plus_sum, minus_sum, tr_sum);
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = rolling mean of DX
    // ------------------------------------------------------------------
    for i in (2 * period - 2)..n {
        let window = &dx[(i + 1 - period)..=i];
        if let Some(sum) = window.iter().copied().sum::<Option<f64>>() {
            out[i] = Some(sum / period as f64);
        }
    }

    out
}

/// Most recent ADX value, `None` when undefined.
pub fn adx(candles: &[Candle], period: usize) -> Option<f64> {
    adx_series(candles, period).last().copied().flatten()
}

/// Compute DX from summed +DM, -DM and TR.
fn compute_dx(plus_sum: f64, minus_sum: f64, tr_sum: f64) -> Option<f64> {
    if !(tr_sum > 0.0) {
        return None;
    }

    let plus_di = plus_sum / tr_sum * 100.0;
    let minus_di = minus_sum / tr_sum * 100.0;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return None;
    }

    let dx = (plus_di - minus_di).abs() / di_sum * 100.0;
    dx.is_finite().then_some(dx)
}

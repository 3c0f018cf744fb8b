// =============================================================================
// Relative Strength Index (RSI) — rolling-mean variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — avg_gain / avg_loss = simple mean of the last `period` positive /
//          negative deltas (NOT Wilder's exponential smoothing).
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds used by callers:  RSI > 70 => overbought,  RSI < 30 => oversold.
// =============================================================================

use super::sma::finite;

/// Default look-back used by the daily / intraday analyzers.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned with the input.
///
/// The first `period` entries are `None` (index `i` needs the `period` deltas
/// ending at `i`).
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - Only gains in the window (avg_loss == 0, avg_gain > 0) => 100.0
/// - No movement at all (both averages zero) => `None`; callers use 50.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let period_f = period as f64;
    let mut gain_sum: f64 = gains[..period].iter().sum();
    let mut loss_sum: f64 = losses[..period].iter().sum();
    out[period] = rsi_from_averages(gain_sum / period_f, loss_sum / period_f);

    // delta index j corresponds to close index j + 1
    for j in period..gains.len() {
        gain_sum += gains[j] - gains[j - period];
        loss_sum += losses[j] - losses[j - period];
        out[j + 1] = rsi_from_averages(gain_sum / period_f, loss_sum / period_f);
    }

    out
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    // Rolling subtraction can leave tiny negative residue.
    let avg_gain = avg_gain.max(0.0);
    let avg_loss = avg_loss.max(0.0);

    if avg_loss <= f64::EPSILON * 16.0 {
        if avg_gain <= f64::EPSILON * 16.0 {
            return None;
        }
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    finite(100.0 - 100.0 / (1.0 + rs))
}

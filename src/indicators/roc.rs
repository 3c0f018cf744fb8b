// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price against an earlier close:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// Percentage change of the latest close against the close `bars_back` bars
/// earlier, counting the latest bar as bar 1 (so the reference close sits at
/// index `len - bars_back`).
///
/// Returns `None` when there are fewer than `bars_back` closes, `bars_back`
/// is zero, or the reference close is zero.
pub fn rate_of_change(closes: &[f64], bars_back: usize) -> Option<f64> {
    if bars_back == 0 || closes.len() < bars_back {
        return None;
    }
    let reference = closes[closes.len() - bars_back];
    let last = *closes.last()?;
    if reference == 0.0 {
        return None;
    }
    let change = (last - reference) / reference * 100.0;
    change.is_finite().then_some(change)
}

/// Bar-over-bar fractional change (`close_t / close_{t-1} - 1`).
///
/// The output has `len - 1` elements; pairs with a zero previous close are
/// skipped.
pub fn pct_change(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|v| v.is_finite())
        .collect()
}

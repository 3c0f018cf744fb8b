// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the sample standard deviation of
// the same window. The Band Width (BBW) is the normalised distance:
// BBW = (upper - lower) / middle * 100.

use super::sma::sample_std;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

/// Result of a Bollinger Band calculation for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

impl BollingerBands {
    /// Position of `price` inside the band: 0.0 at the lower band, 1.0 at the
    /// upper band.  `None` when the band has collapsed.
    pub fn position(&self, price: f64) -> Option<f64> {
        let span = self.upper - self.lower;
        if span.abs() <= f64::EPSILON {
            return None;
        }
        Some((price - self.lower) / span)
    }
}

/// Calculate Bollinger Bands over the last `period` closing prices.
///
/// Returns `None` when:
/// - `period < 2` or fewer than `period` data points.
/// - Middle band is zero (degenerate input).
pub fn bollinger_bands(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
    if period < 2 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    if middle == 0.0 {
        return None;
    }

    let std_dev = sample_std(window)?;
    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = (upper - lower) / middle * 100.0;

    width.is_finite().then_some(BollingerBands {
        upper,
        middle,
        lower,
        width,
    })
}

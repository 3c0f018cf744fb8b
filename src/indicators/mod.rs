// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the timeframe analyzer, the confluence outlook and the TFQE procedure.
//
// Two return shapes are used throughout:
//   - `Vec<Option<f64>>` aligned index-for-index with the input, where `None`
//     marks a bar whose window is not yet full or whose value is undefined.
//   - `Option<f64>` for "latest value" helpers.
//
// No function here substitutes a neutral value.  Callers decide the fallback
// (RSI -> 50, SMA -> current price, stochastic -> 50).

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use adx::adx;
pub use atr::{atr, true_range};
pub use bollinger::{bollinger_bands, BollingerBands};
pub use ema::ema;
pub use macd::{macd, Macd};
pub use roc::{pct_change, rate_of_change};
pub use rsi::rsi;
pub use sma::{rolling_max, rolling_min, sample_std, sma};
pub use stochastic::{stochastic, Stochastic};

/// Last element of an aligned indicator series, flattened.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

// =============================================================================
// Entry-trigger candlestick patterns
// =============================================================================
//
// Bullish engulfing: previous bar bearish, current bar bullish, current open
//   below the previous close and current close above the previous open.
// Bearish engulfing: the mirror image.
// High break: latest close above the highest high of the 3 bars before it.
// Low break:  latest close below the lowest low of the 3 bars before it.
//
// All comparisons are strict.

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;

/// Bars before the latest one that define the breakout range.
pub const BREAKOUT_LOOKBACK: usize = 3;

/// Pattern flags for the latest bar of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFlags {
    pub bullish_engulfing: bool,
    pub bearish_engulfing: bool,
    pub high_break: bool,
    pub low_break: bool,
}

impl PatternFlags {
    /// Evaluate every pattern on the last bar of `candles`.  Patterns that
    /// need more history than is available are `false`.
    pub fn latest(candles: &[Candle]) -> Self {
        let n = candles.len();
        let (bullish_engulfing, bearish_engulfing) = if n >= 2 {
            let (prev, cur) = (&candles[n - 2], &candles[n - 1]);
            (bullish_engulfing(prev, cur), bearish_engulfing(prev, cur))
        } else {
            (false, false)
        };

        Self {
            bullish_engulfing,
            bearish_engulfing,
            high_break: high_break(candles),
            low_break: low_break(candles),
        }
    }
}

pub fn bullish_engulfing(prev: &Candle, cur: &Candle) -> bool {
    prev.is_bearish() && cur.is_bullish() && cur.open < prev.close && cur.close > prev.open
}

pub fn bearish_engulfing(prev: &Candle, cur: &Candle) -> bool {
    prev.is_bullish() && cur.is_bearish() && cur.open > prev.close && cur.close < prev.open
}

pub fn high_break(candles: &[Candle]) -> bool {
    match breakout_window(candles) {
        Some((window, last)) => window
            .iter()
            .map(|c| c.high)
            .reduce(f64::max)
            .is_some_and(|h| last.close > h),
        None => false,
    }
}

pub fn low_break(candles: &[Candle]) -> bool {
    match breakout_window(candles) {
        Some((window, last)) => window
            .iter()
            .map(|c| c.low)
            .reduce(f64::min)
            .is_some_and(|l| last.close < l),
        None => false,
    }
}

fn breakout_window(candles: &[Candle]) -> Option<(&[Candle], &Candle)> {
    let (last, rest) = candles.split_last()?;
    if rest.len() < BREAKOUT_LOOKBACK {
        return None;
    }
    Some((&rest[rest.len() - BREAKOUT_LOOKBACK..], last))
}

// =============================================================================
// Per-Timeframe Analysis
// =============================================================================
//
// Turns one candle series into a normalised `TimeframeAnalysis`:
//
//   1. SMA-short / SMA-long / RSI with timeframe-specific windows, and
//      realised volatility = stddev(pct-change) * 100.
//   2. Trend from price vs. SMA-short vs. SMA-long.
//   3. Momentum from the close change over a lookback.
//   4. Signal by scored confluence of a trend action and an RSI action.
//   5. Support / resistance / pivot from the last 20 bars.
//
// Undefined indicators fall back to neutral values (SMA -> current price,
// RSI -> 50).  Too-short input yields `InsufficientData`, never a signal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{self, latest, pct_change, rate_of_change, rolling_max, rolling_min, sample_std};
use crate::market_data::Series;
use crate::timeframe::{Timeframe, TimeframeParams};
use crate::types::{Momentum, Signal, SignalStrength, Trend, TradingStyle};

/// Fewest bars for which an analysis is produced.
pub const MIN_ANALYSIS_BARS: usize = 2;

/// Momentum needs this many bars regardless of the lookback.
const MIN_MOMENTUM_BARS: usize = 10;

const KEY_LEVEL_WINDOW: usize = 20;
const MAX_CONFIDENCE: f64 = 95.0;
const NEUTRAL_RSI: f64 = 50.0;

/// The series was empty or too short to analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientData {
    pub timeframe: Timeframe,
    pub bars: usize,
    pub required: usize,
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient data for {}: {} bars, need at least {}",
            self.timeframe, self.bars, self.required
        )
    }
}

impl std::error::Error for InsufficientData {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    pub support: f64,
    pub resistance: f64,
    pub pivot: f64,
}

/// Component scores behind a timeframe's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalScores {
    pub trend: u32,
    pub rsi: u32,
    pub momentum: u32,
    pub confluence: u32,
}

impl SignalScores {
    pub fn total(&self) -> u32 {
        self.trend + self.rsi + self.momentum + self.confluence
    }
}

/// Normalised analysis of one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub timeframe: Timeframe,
    pub trading_style: TradingStyle,
    pub current_price: f64,
    pub trend: Trend,
    pub signal: Signal,
    /// 0..=95
    pub confidence: f64,
    pub strength: SignalStrength,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
    pub momentum: Momentum,
    /// Standard deviation of bar-over-bar returns, in percent.
    pub volatility: f64,
    pub key_levels: KeyLevels,
    pub scores: SignalScores,
    pub bars: usize,
}

/// Analyse `series` with the parameters of `timeframe`.
pub fn analyze_timeframe(
    series: &Series,
    timeframe: Timeframe,
) -> Result<TimeframeAnalysis, InsufficientData> {
    let bars = series.len();
    if bars < MIN_ANALYSIS_BARS {
        debug!(timeframe = %timeframe, bars, "timeframe analysis: insufficient data");
        return Err(InsufficientData {
            timeframe,
            bars,
            required: MIN_ANALYSIS_BARS,
        });
    }

    let params = timeframe.params();
    let closes = series.closes();
    let current_price = closes[bars - 1];

    // --- Indicators with neutral fallbacks ---
    let sma_short = latest(&indicators::sma(&closes, params.sma_short)).unwrap_or(current_price);
    let sma_long = latest(&indicators::sma(&closes, params.sma_long)).unwrap_or(current_price);
    let rsi = latest(&indicators::rsi(&closes, params.rsi_period)).unwrap_or(NEUTRAL_RSI);
    let volatility = sample_std(&pct_change(&closes)).map_or(0.0, |s| s * 100.0);

    let trend = classify_trend(current_price, sma_short, sma_long);
    let momentum = classify_momentum(&closes, &params);
    let scored = score_signal(rsi, trend, momentum, &params);

    // --- Key levels ---
    let highs = series.highs();
    let lows = series.lows();
    let resistance = rolling_max(&highs, KEY_LEVEL_WINDOW).unwrap_or(current_price);
    let support = rolling_min(&lows, KEY_LEVEL_WINDOW).unwrap_or(current_price);
    let key_levels = KeyLevels {
        support,
        resistance,
        pivot: (resistance + support + current_price) / 3.0,
    };

    debug!(
        timeframe = %timeframe,
        bars,
        trend = %trend,
        signal = %scored.signal,
        confidence = format!("{:.1}", scored.confidence),
        "timeframe analysis complete"
    );

    Ok(TimeframeAnalysis {
        timeframe,
        trading_style: timeframe.trading_style(),
        current_price,
        trend,
        signal: scored.signal,
        confidence: scored.confidence,
        strength: scored.strength,
        sma_short,
        sma_long,
        rsi,
        momentum,
        volatility,
        key_levels,
        scores: scored.scores,
        bars,
    })
}

// ---------------------------------------------------------------------------
// Classification helpers
// ---------------------------------------------------------------------------

/// Trend from the price / SMA stack.  Equal SMAs are a range.
pub fn classify_trend(price: f64, sma_short: f64, sma_long: f64) -> Trend {
    if sma_short > sma_long && price > sma_short {
        Trend::StrongUp
    } else if sma_short > sma_long {
        Trend::Up
    } else if sma_short < sma_long && price < sma_short {
        Trend::StrongDown
    } else if sma_short < sma_long {
        Trend::Down
    } else {
        Trend::Range
    }
}

fn classify_momentum(closes: &[f64], params: &TimeframeParams) -> Momentum {
    if closes.len() < MIN_MOMENTUM_BARS {
        return Momentum::Unknown;
    }
    match rate_of_change(closes, params.momentum_lookback) {
        Some(change) => bucket_momentum(change),
        None => Momentum::Unknown,
    }
}

/// Bucket a percentage change at the +-1% / +-0.2% thresholds.
pub fn bucket_momentum(change_pct: f64) -> Momentum {
    if change_pct > 1.0 {
        Momentum::Strong
    } else if change_pct > 0.2 {
        Momentum::SlightlyStrong
    } else if change_pct > -0.2 {
        Momentum::Neutral
    } else if change_pct > -1.0 {
        Momentum::SlightlyWeak
    } else {
        Momentum::Weak
    }
}

struct ScoredSignal {
    signal: Signal,
    confidence: f64,
    strength: SignalStrength,
    scores: SignalScores,
}

fn score_signal(rsi: f64, trend: Trend, momentum: Momentum, params: &TimeframeParams) -> ScoredSignal {
    let (trend_score, trend_action) = match trend {
        Trend::StrongUp => (30, Signal::Buy),
        Trend::Up => (20, Signal::Buy),
        Trend::StrongDown => (30, Signal::Sell),
        Trend::Down => (20, Signal::Sell),
        Trend::Range => (0, Signal::Hold),
    };

    // Oversold reads as a buy, overbought as a sell.
    let (rsi_score, rsi_action) = if rsi < 30.0 {
        (25, Signal::Buy)
    } else if rsi < 40.0 {
        (15, Signal::Buy)
    } else if rsi > 70.0 {
        (25, Signal::Sell)
    } else if rsi > 60.0 {
        (15, Signal::Sell)
    } else {
        (5, Signal::Hold)
    };

    let momentum_score = if momentum.is_directional() { 20 } else { 5 };

    let confluence_score = if trend_action == rsi_action && trend_action != Signal::Hold {
        25
    } else if trend_action != Signal::Hold && rsi_action == Signal::Hold {
        10
    } else {
        0
    };

    let scores = SignalScores {
        trend: trend_score,
        rsi: rsi_score,
        momentum: momentum_score,
        confluence: confluence_score,
    };

    let votes = [trend_action, rsi_action];
    let buys = votes.iter().filter(|s| **s == Signal::Buy).count();
    let sells = votes.iter().filter(|s| **s == Signal::Sell).count();
    let signal = match buys.cmp(&sells) {
        std::cmp::Ordering::Greater => Signal::Buy,
        std::cmp::Ordering::Less => Signal::Sell,
        std::cmp::Ordering::Equal => Signal::Hold,
    };

    let confidence = (f64::from(scores.total()) * params.confidence_scale).min(MAX_CONFIDENCE);
    let strength = if confidence >= 75.0 {
        SignalStrength::Strong
    } else if confidence >= 55.0 {
        SignalStrength::Moderate
    } else {
        SignalStrength::Weak
    };

    ScoredSignal {
        signal,
        confidence,
        strength,
        scores,
    }
}

// =============================================================================
// Analysis timeframes and their static parameterisation
// =============================================================================
//
// Every per-timeframe rule in the engine (indicator windows, confidence
// scaling, entry offsets, forecast horizon) is keyed by `Timeframe`.  The
// tables live here so the analyzers stay free of magic numbers.

use serde::{Deserialize, Serialize};

use crate::market_data::Interval;
use crate::types::TradingStyle;

/// The four analysis horizons, ordered short to long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 5-minute bars, scalping.
    #[serde(rename = "5m")]
    UltraShort,
    /// 1-hour bars, day trading.
    #[serde(rename = "1h")]
    Short,
    /// 4-hour bars, position trading.
    #[serde(rename = "4h")]
    Medium,
    /// Daily bars, swing trading.
    #[serde(rename = "1d")]
    Long,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Self::UltraShort, Self::Short, Self::Medium, Self::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UltraShort => "5m",
            Self::Short => "1h",
            Self::Medium => "4h",
            Self::Long => "1d",
        }
    }

    /// Candle interval fetched for this timeframe.
    pub fn interval(&self) -> Interval {
        match self {
            Self::UltraShort => Interval::M5,
            Self::Short => Interval::H1,
            Self::Medium => Interval::H4,
            Self::Long => Interval::D1,
        }
    }

    pub fn trading_style(&self) -> TradingStyle {
        match self {
            Self::UltraShort => TradingStyle::Scalping,
            Self::Short => TradingStyle::DayTrading,
            Self::Medium => TradingStyle::PositionTrading,
            Self::Long => TradingStyle::SwingTrading,
        }
    }

    pub fn params(&self) -> TimeframeParams {
        match self {
            Self::UltraShort => TimeframeParams {
                sma_short: 5,
                sma_long: 20,
                rsi_period: 9,
                momentum_lookback: 5,
                confidence_scale: 0.85,
            },
            Self::Short => TimeframeParams {
                sma_short: 10,
                sma_long: 25,
                rsi_period: 14,
                momentum_lookback: 10,
                confidence_scale: 1.0,
            },
            Self::Medium => TimeframeParams {
                sma_short: 12,
                sma_long: 26,
                rsi_period: 14,
                momentum_lookback: 10,
                confidence_scale: 1.05,
            },
            Self::Long => TimeframeParams {
                sma_short: 20,
                sma_long: 50,
                rsi_period: 14,
                momentum_lookback: 10,
                confidence_scale: 1.15,
            },
        }
    }

    /// Static trading profile for this horizon.
    pub fn profile(&self) -> TimeframeProfile {
        match self {
            Self::UltraShort => TimeframeProfile {
                style: TradingStyle::Scalping,
                holding_period: "1-30 minutes",
                profit_target_pips: (5, 15),
                stop_loss_pips: (3, 8),
                frequency: "10-50 trades per day",
                best_sessions: &["Tokyo fixing", "Early London", "Early New York"],
                avoid_times: &["Tokyo lunch", "European lunch", "Around major releases"],
            },
            Self::Short => TimeframeProfile {
                style: TradingStyle::DayTrading,
                holding_period: "1-12 hours",
                profit_target_pips: (20, 50),
                stop_loss_pips: (15, 30),
                frequency: "1-5 trades per day",
                best_sessions: &["Tokyo", "London", "New York"],
                avoid_times: &["Before the weekly close", "Right before major releases"],
            },
            Self::Medium => TimeframeProfile {
                style: TradingStyle::PositionTrading,
                holding_period: "1-7 days",
                profit_target_pips: (50, 150),
                stop_loss_pips: (30, 80),
                frequency: "1-3 trades per week",
                best_sessions: &["Start of week", "After major releases"],
                avoid_times: &["Weekends", "Before holidays"],
            },
            Self::Long => TimeframeProfile {
                style: TradingStyle::SwingTrading,
                holding_period: "1 week - 1 month",
                profit_target_pips: (100, 500),
                stop_loss_pips: (50, 200),
                frequency: "1-4 trades per month",
                best_sessions: &["Start of month", "Quarter end"],
                avoid_times: &["Year-end holidays", "Summer holidays"],
            },
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator windows and confidence scaling for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeframeParams {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    /// Bars back (counting the latest) for the momentum change.
    pub momentum_lookback: usize,
    /// Multiplier applied to the raw signal score.
    pub confidence_scale: f64,
}

/// Descriptive trading profile of a timeframe.
#[derive(Debug, Clone, Serialize)]
pub struct TimeframeProfile {
    pub style: TradingStyle,
    pub holding_period: &'static str,
    pub profit_target_pips: (u32, u32),
    pub stop_loss_pips: (u32, u32),
    pub frequency: &'static str,
    pub best_sessions: &'static [&'static str],
    pub avoid_times: &'static [&'static str],
}

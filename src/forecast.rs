// =============================================================================
// Next-Move Forecast
// =============================================================================
//
// Projects a `TimeframeAnalysis` forward over the timeframe's horizon:
//
//   direction   BUY -> Up, SELL -> Down, HOLD -> Sideways
//   target      price * (1 +/- expected_move%), price when sideways
//   band        Up:   support = price * (1 - move/200), resistance = target * 1.001
//               Down: support = target * 0.999, resistance = price * (1 + move/200)
//               Sideways: price * 0.998 .. price * 1.002
//   scenarios   main at the analysis confidence, alternative at 100 - confidence
//               (a breakout alternative at 40 when sideways)

use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;
use crate::timeframe_analysis::TimeframeAnalysis;
use crate::types::{Signal, Trend};

const SIDEWAYS_BAND: f64 = 0.002;
const BREAKOUT_PROBABILITY: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Sideways,
    Breakout,
}

impl Direction {
    fn from_signal(signal: Signal) -> Self {
        match signal {
            Signal::Buy => Self::Up,
            Signal::Sell => Self::Down,
            Signal::Hold => Self::Sideways,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiNote {
    Overbought,
    Oversold,
    Neutral,
    Healthy,
}

impl RsiNote {
    pub fn classify(rsi: f64) -> Self {
        if rsi > 70.0 {
            Self::Overbought
        } else if rsi < 30.0 {
            Self::Oversold
        } else if (45.0..=55.0).contains(&rsi) {
            Self::Neutral
        } else {
            Self::Healthy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendNote {
    /// Forecast agrees with the prevailing trend.
    TrendFollow,
    /// Forecast opposes the prevailing trend.
    Reversal,
    /// Sideways forecast inside a trend.
    Pullback,
    Range,
}

impl TrendNote {
    pub fn classify(trend: Trend, direction: Direction) -> Self {
        let trending_up = trend.is_up();
        let trending_down = trend.is_down();
        match direction {
            _ if !trending_up && !trending_down => Self::Range,
            Direction::Up if trending_up => Self::TrendFollow,
            Direction::Down if trending_down => Self::TrendFollow,
            Direction::Up | Direction::Down => Self::Reversal,
            Direction::Sideways | Direction::Breakout => Self::Pullback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn classify(confidence: f64) -> Self {
        if confidence > 75.0 {
            Self::High
        } else if confidence > 55.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub direction: Direction,
    pub probability: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub horizon: String,
    pub direction: Direction,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub current_price: f64,
    pub target_price: f64,
    pub support: f64,
    pub resistance: f64,
    pub expected_move_pct: f64,
    pub rsi_note: RsiNote,
    pub trend_note: TrendNote,
    pub main_scenario: Scenario,
    pub alternative_scenario: Scenario,
}

pub fn horizon_for(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::UltraShort => "Next 15-30 minutes",
        Timeframe::Short => "Next 2-4 hours",
        Timeframe::Medium => "Next 12-24 hours",
        Timeframe::Long => "Next 3-7 days",
    }
}

/// Expected move over the horizon, in percent.
pub fn expected_move_pct(timeframe: Timeframe) -> f64 {
    match timeframe {
        Timeframe::UltraShort => 0.1,
        Timeframe::Short => 0.3,
        Timeframe::Medium => 0.8,
        Timeframe::Long => 2.0,
    }
}

pub fn forecast_next_move(analysis: &TimeframeAnalysis) -> Forecast {
    let price = analysis.current_price;
    let confidence = analysis.confidence;
    let move_pct = expected_move_pct(analysis.timeframe);
    let direction = Direction::from_signal(analysis.signal);

    let up_target = price * (1.0 + move_pct / 100.0);
    let down_target = price * (1.0 - move_pct / 100.0);

    let (target_price, support, resistance, alternative_scenario) = match direction {
        Direction::Up => (
            up_target,
            price * (1.0 - move_pct / 200.0),
            up_target * 1.001,
            Scenario {
                direction: Direction::Down,
                probability: 100.0 - confidence,
                target: down_target,
            },
        ),
        Direction::Down => (
            down_target,
            down_target * 0.999,
            price * (1.0 + move_pct / 200.0),
            Scenario {
                direction: Direction::Up,
                probability: 100.0 - confidence,
                target: up_target,
            },
        ),
        Direction::Sideways | Direction::Breakout => (
            price,
            price * (1.0 - SIDEWAYS_BAND),
            price * (1.0 + SIDEWAYS_BAND),
            Scenario {
                direction: Direction::Breakout,
                probability: BREAKOUT_PROBABILITY,
                target: price,
            },
        ),
    };

    Forecast {
        horizon: horizon_for(analysis.timeframe).to_string(),
        direction,
        confidence,
        confidence_level: ConfidenceLevel::classify(confidence),
        current_price: price,
        target_price,
        support,
        resistance,
        expected_move_pct: move_pct,
        rsi_note: RsiNote::classify(analysis.rsi),
        trend_note: TrendNote::classify(analysis.trend, direction),
        main_scenario: Scenario {
            direction,
            probability: confidence,
            target: target_price,
        },
        alternative_scenario,
    }
}

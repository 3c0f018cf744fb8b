// =============================================================================
// Single-Series Confluence Outlook
// =============================================================================
//
// A one-timeframe (usually daily) read that combines moving averages, MACD,
// RSI, Stochastic and Bollinger position into a scored call.
//
// Trend score (0..=7):
//   SMA20 > SMA50 (+2), price > SMA20 (+1), price > SMA50 (+1),
//   MACD > signal (+2), MACD > 0 (+1)
//   >= 6 StrongUp, >= 4 Up, >= 3 Range, >= 1 Down, else StrongDown
//
// Buy / sell score:
//   RSI < 30 (+3 buy), < 40 (+1 buy), > 70 (+3 sell), > 60 (+1 sell)
//   %K < 20 (+2 buy), > 80 (+2 sell)
//   Bollinger position < 0.2 (+2 buy), > 0.8 (+2 sell)
//   trend up (+2 buy), trend down (+2 sell)
//
// A side needs a score of at least 5 and strictly more than the other side.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::bollinger::{DEFAULT_NUM_STD, DEFAULT_PERIOD};
use crate::indicators::ema::latest_ema;
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::indicators::{bollinger_bands, latest, macd, rsi, rolling_max, rolling_min, sma, stochastic};
use crate::market_data::Series;
use crate::types::{Signal, SignalStrength, Trend};

const STOCHASTIC_PERIOD: usize = 14;
const RECENT_WINDOW: usize = 20;
const MIN_ACTION_SCORE: u32 = 5;
const HOLD_CONFIDENCE: f64 = 30.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Latest indicator values with neutral fallbacks applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub ema20: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// 0 at the lower band, 1 at the upper band.
    pub bb_position: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
}

/// Classic floor pivots from the last bar plus the recent range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub current_price: f64,
    pub pivot: f64,
    pub resistance_1: f64,
    pub resistance_2: f64,
    pub support_1: f64,
    pub support_2: f64,
    pub recent_high: f64,
    pub recent_low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceOutlook {
    pub trend: Trend,
    pub signal: Signal,
    pub strength: SignalStrength,
    pub confidence: f64,
    pub buy_score: u32,
    pub sell_score: u32,
    pub indicators: IndicatorSnapshot,
    pub levels: PivotLevels,
    /// Reward / risk against S1 and R1; 0 for HOLD or a non-positive risk.
    pub risk_reward: f64,
    /// Suggested position size in percent of the normal size.
    pub position_size_pct: f64,
}

/// Compute the outlook for `series`.  `None` for an empty series.
pub fn confluence_outlook(series: &Series) -> Option<ConfluenceOutlook> {
    let last = *series.last()?;
    let closes = series.closes();
    let highs = series.highs();
    let lows = series.lows();

    let indicators = snapshot(&closes, &highs, &lows, last.close);
    let trend = classify_trend(&indicators);
    let (buy_score, sell_score) = side_scores(&indicators, trend);

    let (signal, strength, confidence) = if buy_score > sell_score && buy_score >= MIN_ACTION_SCORE {
        (Signal::Buy, strength_for(buy_score), score_confidence(buy_score))
    } else if sell_score > buy_score && sell_score >= MIN_ACTION_SCORE {
        (Signal::Sell, strength_for(sell_score), score_confidence(sell_score))
    } else {
        (Signal::Hold, SignalStrength::Weak, HOLD_CONFIDENCE)
    };

    // --- Floor pivots ---
    let pivot = (last.high + last.low + last.close) / 3.0;
    let range = last.high - last.low;
    let levels = PivotLevels {
        current_price: last.close,
        pivot,
        resistance_1: 2.0 * pivot - last.low,
        resistance_2: pivot + range,
        support_1: 2.0 * pivot - last.high,
        support_2: pivot - range,
        recent_high: rolling_max(&highs, RECENT_WINDOW).unwrap_or(last.high),
        recent_low: rolling_min(&lows, RECENT_WINDOW).unwrap_or(last.low),
    };

    let rr = risk_reward(signal, &levels);
    let position_size_pct = position_size(indicators.rsi, trend);

    debug!(
        bars = series.len(),
        trend = %trend,
        signal = %signal,
        buy_score,
        sell_score,
        "confluence outlook computed"
    );

    Some(ConfluenceOutlook {
        trend,
        signal,
        strength,
        confidence,
        buy_score,
        sell_score,
        indicators,
        levels,
        risk_reward: rr,
        position_size_pct,
    })
}

fn snapshot(closes: &[f64], highs: &[f64], lows: &[f64], price: f64) -> IndicatorSnapshot {
    let (macd_line, macd_signal, _) = macd(closes).latest().unwrap_or((0.0, 0.0, 0.0));
    let bands = bollinger_bands(closes, DEFAULT_PERIOD, DEFAULT_NUM_STD);
    let stoch = stochastic(highs, lows, closes, STOCHASTIC_PERIOD);

    IndicatorSnapshot {
        price,
        sma20: latest(&sma(closes, 20)).unwrap_or(price),
        sma50: latest(&sma(closes, 50)).unwrap_or(price),
        ema20: latest_ema(closes, 20).unwrap_or(price),
        rsi: latest(&rsi(closes, DEFAULT_RSI_PERIOD)).unwrap_or(50.0),
        macd: macd_line,
        macd_signal,
        bb_upper: bands.map_or(price, |b| b.upper),
        bb_lower: bands.map_or(price, |b| b.lower),
        bb_position: bands.and_then(|b| b.position(price)).unwrap_or(0.5),
        stoch_k: stoch.latest_k().unwrap_or(50.0),
        stoch_d: stoch.latest_d().unwrap_or(50.0),
    }
}

fn classify_trend(ind: &IndicatorSnapshot) -> Trend {
    let mut score = 0;
    if ind.sma20 > ind.sma50 {
        score += 2;
    }
    if ind.price > ind.sma20 {
        score += 1;
    }
    if ind.price > ind.sma50 {
        score += 1;
    }
    if ind.macd > ind.macd_signal {
        score += 2;
    }
    if ind.macd > 0.0 {
        score += 1;
    }

    match score {
        6.. => Trend::StrongUp,
        4..=5 => Trend::Up,
        3 => Trend::Range,
        1..=2 => Trend::Down,
        _ => Trend::StrongDown,
    }
}

fn side_scores(ind: &IndicatorSnapshot, trend: Trend) -> (u32, u32) {
    let mut buy = 0;
    let mut sell = 0;

    if ind.rsi < 30.0 {
        buy += 3;
    } else if ind.rsi < 40.0 {
        buy += 1;
    } else if ind.rsi > 70.0 {
        sell += 3;
    } else if ind.rsi > 60.0 {
        sell += 1;
    }

    if ind.stoch_k < 20.0 {
        buy += 2;
    } else if ind.stoch_k > 80.0 {
        sell += 2;
    }

    if ind.bb_position < 0.2 {
        buy += 2;
    } else if ind.bb_position > 0.8 {
        sell += 2;
    }

    if trend.is_up() {
        buy += 2;
    } else if trend.is_down() {
        sell += 2;
    }

    (buy, sell)
}

fn strength_for(score: u32) -> SignalStrength {
    match score {
        10.. => SignalStrength::VeryStrong,
        8..=9 => SignalStrength::Strong,
        6..=7 => SignalStrength::Moderate,
        4..=5 => SignalStrength::Weak,
        _ => SignalStrength::VeryWeak,
    }
}

fn score_confidence(score: u32) -> f64 {
    (f64::from(score) * 10.0).min(MAX_CONFIDENCE)
}

fn risk_reward(signal: Signal, levels: &PivotLevels) -> f64 {
    let price = levels.current_price;
    let (risk, reward) = match signal {
        Signal::Buy => (price - levels.support_1, levels.resistance_1 - price),
        Signal::Sell => (levels.resistance_1 - price, price - levels.support_1),
        Signal::Hold => return 0.0,
    };
    if risk > 0.0 {
        reward / risk
    } else {
        0.0
    }
}

fn position_size(rsi: f64, trend: Trend) -> f64 {
    let base: f64 = if rsi > 70.0 || rsi < 30.0 { 50.0 } else { 100.0 };
    let adjustment = match trend {
        Trend::StrongUp | Trend::StrongDown => 1.2,
        Trend::Range => 0.5,
        Trend::Up | Trend::Down => 1.0,
    };
    (base * adjustment).min(100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::candle::series_from_closes;

    fn neutral_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 100.0,
            sma20: 100.0,
            sma50: 100.0,
            ema20: 100.0,
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            bb_upper: 101.0,
            bb_lower: 99.0,
            bb_position: 0.5,
            stoch_k: 50.0,
            stoch_d: 50.0,
        }
    }

    #[test]
    fn empty_series_has_no_outlook() {
        assert!(confluence_outlook(&Series::new()).is_none());
    }

    #[test]
    fn single_bar_falls_back_to_neutral() {
        let out = confluence_outlook(&series_from_closes(&[150.0])).unwrap();
        assert_eq!(out.indicators.rsi, 50.0);
        assert_eq!(out.indicators.stoch_k, 50.0);
        assert_eq!(out.indicators.sma20, 150.0);
        assert_eq!(out.signal, Signal::Hold);
        assert_eq!(out.confidence, 30.0);
        assert_eq!(out.risk_reward, 0.0);
    }

    #[test]
    fn trend_score_thresholds() {
        let mut ind = neutral_snapshot();
        assert_eq!(classify_trend(&ind), Trend::StrongDown);

        ind.macd = 0.5;
        ind.macd_signal = 0.1;
        assert_eq!(classify_trend(&ind), Trend::Range);

        ind.price = 101.0;
        assert_eq!(classify_trend(&ind), Trend::Up);

        ind.sma20 = 100.5;
        assert_eq!(classify_trend(&ind), Trend::StrongUp);
    }

    #[test]
    fn mixed_readings_score_both_sides() {
        let mut ind = neutral_snapshot();
        ind.rsi = 25.0; // +3 buy
        ind.bb_position = 0.9; // +2 sell
        let (buy, sell) = side_scores(&ind, Trend::Down); // +2 sell
        assert_eq!((buy, sell), (3, 4));
    }

    #[test]
    fn strength_buckets() {
        assert_eq!(strength_for(11), SignalStrength::VeryStrong);
        assert_eq!(strength_for(8), SignalStrength::Strong);
        assert_eq!(strength_for(6), SignalStrength::Moderate);
        assert_eq!(strength_for(5), SignalStrength::Weak);
        assert_eq!(strength_for(3), SignalStrength::VeryWeak);
        assert_eq!(score_confidence(11), 95.0);
    }

    #[test]
    fn steady_rally_is_overbought_sell() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.5).collect();
        let out = confluence_outlook(&series_from_closes(&closes)).unwrap();
        assert_eq!(out.trend, Trend::StrongUp);
        // RSI 100 (+3), %K high (+2), upper band (+2) vs trend (+2 buy)
        assert_eq!(out.signal, Signal::Sell);
        assert_eq!(out.sell_score, 7);
        assert_eq!(out.buy_score, 2);
        assert_eq!(out.strength, SignalStrength::Moderate);
        assert_eq!(out.confidence, 70.0);
    }

    #[test]
    fn pivots_follow_floor_formula() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let out = confluence_outlook(&series_from_closes(&closes)).unwrap();
        let l = out.levels;
        // R2 and S2 sit one bar range either side of the pivot.
        assert!(((l.resistance_2 - l.pivot) - (l.pivot - l.support_2)).abs() < 1e-9);
        assert!(l.support_2 < l.support_1 && l.resistance_1 < l.resistance_2);
        assert!(l.recent_high >= l.recent_low);
    }

    #[test]
    fn position_size_rules() {
        assert_eq!(position_size(50.0, Trend::StrongUp), 100.0);
        assert_eq!(position_size(75.0, Trend::StrongUp), 60.0);
        assert_eq!(position_size(50.0, Trend::Range), 50.0);
        assert_eq!(position_size(25.0, Trend::Down), 50.0);
    }

    #[test]
    fn risk_reward_uses_s1_r1() {
        let levels = PivotLevels {
            current_price: 100.0,
            pivot: 100.0,
            resistance_1: 103.0,
            resistance_2: 104.0,
            support_1: 99.0,
            support_2: 98.0,
            recent_high: 104.0,
            recent_low: 98.0,
        };
        assert!((risk_reward(Signal::Buy, &levels) - 3.0).abs() < 1e-12);
        assert!((risk_reward(Signal::Sell, &levels) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(risk_reward(Signal::Hold, &levels), 0.0);
    }
}

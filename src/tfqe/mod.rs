// =============================================================================
// TFQE: Trend Filter, Quick Entry
// =============================================================================
//
// A two-series procedure: the H1 series decides the trend bias, the entry
// series (M15, or M5 when M15 is unavailable) decides whether to enter now.
//
// Evaluation order (first match wins):
//   1. Either series empty                        -> NO_DATA
//   2. Hour given and outside [16, 24)            -> OUT_OF_SESSION
//   3. H1 EMA50/EMA200 + ADX14 >= 20              -> bias Up / Down
//      otherwise                                  -> NO_TREND
//   4. Up bias:   low  <= EMA20 * (1 + buffer) and (bull engulfing or high break)
//      Down bias: high >= EMA20 * (1 - buffer) and (bear engulfing or low break)
//        -> BUY / SELL with stop, TP1 (1R), TP2 (2.5R)
//        -> INVALID_RISK when the computed risk is not positive
//      otherwise                                  -> WAITING_PULLBACK / WAITING_RALLY
//
// Every function here is pure; logging stays at debug level.

pub mod patterns;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::adx::{adx, DEFAULT_ADX_PERIOD};
use crate::indicators::atr::{atr, DEFAULT_ATR_PERIOD};
use crate::indicators::ema::latest_ema;
use crate::market_data::Series;
use crate::runtime_config::TfqeParams;
use crate::types::Side;

pub use patterns::PatternFlags;

const FAST_EMA: usize = 20;
const MID_EMA: usize = 50;
const SLOW_EMA: usize = 200;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Up,
    Down,
}

impl TrendBias {
    pub fn side(self) -> Side {
        match self {
            Self::Up => Side::Buy,
            Self::Down => Side::Sell,
        }
    }
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// Which pattern fired the entry.  Engulfing takes precedence when both do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryTrigger {
    Engulfing,
    Breakout,
}

/// H1 trend-filter readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct H1Snapshot {
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub adx: Option<f64>,
}

/// Entry-series readings on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub ema20: f64,
    pub ema50: Option<f64>,
    pub atr: Option<f64>,
    pub patterns: PatternFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub risk_pips: f64,
    pub reward_pips: f64,
    pub confidence: f64,
    pub trigger: EntryTrigger,
    pub h1: H1Snapshot,
    pub entry_bar: EntrySnapshot,
}

impl TradeSetup {
    pub fn risk(&self) -> f64 {
        (self.entry - self.stop_loss).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TfqeSignal {
    NoData,
    OutOfSession {
        hour: u32,
    },
    NoTrend {
        h1: H1Snapshot,
    },
    WaitingPullback {
        h1: H1Snapshot,
        price: f64,
        ema20: f64,
        distance_pct: f64,
    },
    WaitingRally {
        h1: H1Snapshot,
        price: f64,
        ema20: f64,
        distance_pct: f64,
    },
    InvalidRisk {
        bias: TrendBias,
    },
    Buy(TradeSetup),
    Sell(TradeSetup),
}

impl TfqeSignal {
    /// Name as it appears in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoData => "NO_DATA",
            Self::OutOfSession { .. } => "OUT_OF_SESSION",
            Self::NoTrend { .. } => "NO_TREND",
            Self::WaitingPullback { .. } => "WAITING_PULLBACK",
            Self::WaitingRally { .. } => "WAITING_RALLY",
            Self::InvalidRisk { .. } => "INVALID_RISK",
            Self::Buy(_) => "BUY",
            Self::Sell(_) => "SELL",
        }
    }

    pub fn setup(&self) -> Option<(Side, &TradeSetup)> {
        match self {
            Self::Buy(setup) => Some((Side::Buy, setup)),
            Self::Sell(setup) => Some((Side::Sell, setup)),
            _ => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.setup().is_some()
    }
}

impl fmt::Display for TfqeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Strategy
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TfqeStrategy {
    params: TfqeParams,
}

impl TfqeStrategy {
    pub fn new(params: TfqeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TfqeParams {
        &self.params
    }

    /// Run the full procedure.  `current_hour` is the local hour of day; when
    /// `None` the session gate is skipped.
    pub fn detect(&self, h1: &Series, entry: &Series, current_hour: Option<u32>) -> TfqeSignal {
        let Some(last) = entry.last().copied() else {
            return TfqeSignal::NoData;
        };
        if h1.is_empty() {
            return TfqeSignal::NoData;
        }

        if let Some(hour) = current_hour {
            if !self.params.in_session(hour) {
                debug!(hour, "TFQE: outside trading session");
                return TfqeSignal::OutOfSession { hour };
            }
        }

        // ------------------------------------------------------------------
        // Step 1: H1 trend filter
        // ------------------------------------------------------------------
        let h1_snapshot = h1_snapshot(h1);
        let Some(bias) = self.trend_bias(&h1_snapshot) else {
            debug!(?h1_snapshot, "TFQE: no H1 trend");
            return TfqeSignal::NoTrend { h1: h1_snapshot };
        };

        // ------------------------------------------------------------------
        // Step 2: entry trigger
        // ------------------------------------------------------------------
        let closes = entry.closes();
        let Some(ema20) = latest_ema(&closes, FAST_EMA) else {
            return TfqeSignal::NoData;
        };
        let snapshot = EntrySnapshot {
            ema20,
            ema50: latest_ema(&closes, MID_EMA),
            atr: atr(entry.candles(), DEFAULT_ATR_PERIOD),
            patterns: PatternFlags::latest(entry.candles()),
        };

        let p = &self.params;
        let flags = snapshot.patterns;
        let trigger = match bias {
            TrendBias::Up if last.low <= ema20 * (1.0 + p.ema_touch_buffer) => {
                pick_trigger(flags.bullish_engulfing, flags.high_break)
            }
            TrendBias::Down if last.high >= ema20 * (1.0 - p.ema_touch_buffer) => {
                pick_trigger(flags.bearish_engulfing, flags.low_break)
            }
            _ => None,
        };

        let Some(trigger) = trigger else {
            let distance_pct = if ema20 != 0.0 {
                (last.close - ema20) / ema20 * 100.0
            } else {
                0.0
            };
            debug!(%bias, price = last.close, ema20, distance_pct, "TFQE: waiting for entry");
            let (h1, price) = (h1_snapshot, last.close);
            return match bias {
                TrendBias::Up => TfqeSignal::WaitingPullback { h1, price, ema20, distance_pct },
                TrendBias::Down => TfqeSignal::WaitingRally { h1, price, ema20, distance_pct },
            };
        };

        // ------------------------------------------------------------------
        // Step 3: stop / targets
        // ------------------------------------------------------------------
        let side = bias.side();
        let dir = side.direction();
        let entry_price = last.close;
        let structural = match side {
            Side::Buy => last.low - p.stop_buffer,
            Side::Sell => last.high + p.stop_buffer,
        };
        let stop_loss = match snapshot.atr {
            Some(a) => {
                let volatility_stop = entry_price - dir * p.atr_stop_multiplier * a;
                match side {
                    Side::Buy => structural.max(volatility_stop),
                    Side::Sell => structural.min(volatility_stop),
                }
            }
            None => structural,
        };

        let risk = dir * (entry_price - stop_loss);
        if !(risk > 0.0) {
            debug!(%bias, entry_price, stop_loss, "TFQE: non-positive risk");
            return TfqeSignal::InvalidRisk { bias };
        }

        let take_profit_1 = entry_price + dir * p.tp1_risk_multiple * risk;
        let take_profit_2 = entry_price + dir * p.tp2_risk_multiple * risk;
        let setup = TradeSetup {
            entry: entry_price,
            stop_loss,
            take_profit_1,
            take_profit_2,
            risk_pips: risk * p.pip_multiplier,
            reward_pips: (take_profit_1 - entry_price).abs() * p.pip_multiplier,
            confidence: p.confidence,
            trigger,
            h1: h1_snapshot,
            entry_bar: snapshot,
        };

        debug!(
            %side,
            ?trigger,
            entry = setup.entry,
            stop = setup.stop_loss,
            tp1 = setup.take_profit_1,
            tp2 = setup.take_profit_2,
            "TFQE: entry signal"
        );

        match side {
            Side::Buy => TfqeSignal::Buy(setup),
            Side::Sell => TfqeSignal::Sell(setup),
        }
    }

    fn trend_bias(&self, h1: &H1Snapshot) -> Option<TrendBias> {
        let (fast, slow, adx) = (h1.ema50?, h1.ema200?, h1.adx?);
        if adx < self.params.adx_threshold {
            return None;
        }
        if fast > slow {
            Some(TrendBias::Up)
        } else if fast < slow {
            Some(TrendBias::Down)
        } else {
            None
        }
    }
}

fn h1_snapshot(h1: &Series) -> H1Snapshot {
    let closes = h1.closes();
    H1Snapshot {
        ema50: latest_ema(&closes, MID_EMA),
        ema200: latest_ema(&closes, SLOW_EMA),
        adx: adx(h1.candles(), DEFAULT_ADX_PERIOD),
    }
}

fn pick_trigger(engulfing: bool, breakout: bool) -> Option<EntryTrigger> {
    if engulfing {
        Some(EntryTrigger::Engulfing)
    } else if breakout {
        Some(EntryTrigger::Breakout)
    } else {
        None
    }
}

/// TFQE with default parameters.
pub fn detect_tfqe_signal(h1: &Series, entry: &Series, current_hour: Option<u32>) -> TfqeSignal {
    TfqeStrategy::default().detect(h1, entry, current_hour)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::candle::{series_from_closes, test_series, test_series_with_step};
    use chrono::Duration;

    fn rising_h1() -> Series {
        let bars: Vec<_> = (0..250)
            .map(|i| {
                let c = 100.0 + 0.1 * i as f64;
                (c - 0.1, c + 0.1, c - 0.1, c)
            })
            .collect();
        test_series(&bars)
    }

    fn falling_h1() -> Series {
        let bars: Vec<_> = (0..250)
            .map(|i| {
                let c = 200.0 - 0.1 * i as f64;
                (c + 0.1, c + 0.1, c - 0.1, c)
            })
            .collect();
        test_series(&bars)
    }

    fn m15(bars: &[(f64, f64, f64, f64)]) -> Series {
        test_series_with_step(bars, Duration::minutes(15))
    }

    fn flat(n: usize) -> Vec<(f64, f64, f64, f64)> {
        vec![(150.0, 150.05, 149.95, 150.0); n]
    }

    fn bullish_engulfing_entry() -> Series {
        let mut bars = flat(60);
        bars.push((150.0, 150.05, 149.85, 149.9));
        bars.push((149.85, 150.15, 149.8, 150.1));
        m15(&bars)
    }

    fn bearish_engulfing_entry() -> Series {
        let mut bars = flat(60);
        bars.push((150.0, 150.15, 149.95, 150.1));
        bars.push((150.15, 150.2, 149.85, 149.9));
        m15(&bars)
    }

    // -------------------------------------------------------------------
    // Gates
    // -------------------------------------------------------------------

    #[test]
    fn empty_series_is_no_data() {
        let empty = Series::new();
        assert_eq!(detect_tfqe_signal(&empty, &bullish_engulfing_entry(), Some(18)), TfqeSignal::NoData);
        assert_eq!(detect_tfqe_signal(&rising_h1(), &empty, Some(18)), TfqeSignal::NoData);
        // NO_DATA wins over the session gate.
        assert_eq!(detect_tfqe_signal(&empty, &empty, Some(10)), TfqeSignal::NoData);
    }

    #[test]
    fn hour_outside_session() {
        let sig = detect_tfqe_signal(&rising_h1(), &bullish_engulfing_entry(), Some(10));
        assert_eq!(sig, TfqeSignal::OutOfSession { hour: 10 });
        assert_eq!(sig.name(), "OUT_OF_SESSION");

        let sig = detect_tfqe_signal(&rising_h1(), &bullish_engulfing_entry(), Some(15));
        assert_eq!(sig, TfqeSignal::OutOfSession { hour: 15 });
    }

    #[test]
    fn flat_h1_has_no_trend() {
        let sig = detect_tfqe_signal(&m15(&flat(250)), &bullish_engulfing_entry(), Some(18));
        match sig {
            TfqeSignal::NoTrend { h1 } => assert!(h1.adx.is_none()),
            other => panic!("expected NO_TREND, got {other}"),
        }
    }

    #[test]
    fn choppy_h1_has_no_trend() {
        let closes: Vec<f64> = (0..250)
            .map(|i| if i % 2 == 0 { 100.0 } else { 100.5 })
            .collect();
        let sig = detect_tfqe_signal(&series_from_closes(&closes), &bullish_engulfing_entry(), Some(18));
        assert_eq!(sig.name(), "NO_TREND");
    }

    // -------------------------------------------------------------------
    // Entries
    // -------------------------------------------------------------------

    #[test]
    fn buy_on_bullish_engulfing_in_uptrend() {
        let sig = detect_tfqe_signal(&rising_h1(), &bullish_engulfing_entry(), Some(18));
        let TfqeSignal::Buy(setup) = &sig else {
            panic!("expected BUY, got {sig}");
        };
        assert_eq!(setup.trigger, EntryTrigger::Engulfing);
        assert!((setup.entry - 150.1).abs() < 1e-9);
        assert!(setup.stop_loss < setup.entry);
        assert!(setup.entry < setup.take_profit_1);
        assert!(setup.take_profit_1 < setup.take_profit_2);
        assert!((setup.take_profit_1 - setup.entry - setup.risk()).abs() < 1e-9);
        assert!((setup.take_profit_2 - setup.entry - 2.5 * setup.risk()).abs() < 1e-9);
        assert!((setup.risk_pips - setup.risk() * 100.0).abs() < 1e-9);
        assert!((setup.reward_pips - setup.risk_pips).abs() < 1e-9);
        assert_eq!(setup.confidence, 75.0);
        assert!(setup.h1.adx.is_some_and(|a| a >= 20.0));
    }

    #[test]
    fn buy_stop_is_tighter_of_structure_and_atr() {
        let sig = detect_tfqe_signal(&rising_h1(), &bullish_engulfing_entry(), None);
        let (_, setup) = sig.setup().expect("buy");
        let atr = setup.entry_bar.atr.expect("atr");
        let structural: f64 = 149.8 - 0.02;
        let expected = structural.max(setup.entry - 0.8 * atr);
        assert!((setup.stop_loss - expected).abs() < 1e-9);
    }

    #[test]
    fn sell_on_bearish_engulfing_in_downtrend() {
        let sig = detect_tfqe_signal(&falling_h1(), &bearish_engulfing_entry(), Some(20));
        let TfqeSignal::Sell(setup) = &sig else {
            panic!("expected SELL, got {sig}");
        };
        assert!(setup.stop_loss > setup.entry);
        assert!(setup.entry > setup.take_profit_1);
        assert!(setup.take_profit_1 > setup.take_profit_2);
        assert!(setup.risk_pips > 0.0);
    }

    #[test]
    fn breakout_trigger_when_no_engulfing() {
        // Three quiet bars then a close above their highs that still dips to EMA20.
        let mut bars = flat(60);
        bars.push((150.0, 150.25, 149.9, 150.2));
        let sig = detect_tfqe_signal(&rising_h1(), &m15(&bars), Some(18));
        let (side, setup) = sig.setup().expect("breakout buy");
        assert_eq!(side, Side::Buy);
        assert_eq!(setup.trigger, EntryTrigger::Breakout);
    }

    #[test]
    fn extended_price_waits_for_pullback() {
        let closes: Vec<f64> = (0..60).map(|i| 150.0 + 0.1 * i as f64).collect();
        let sig = detect_tfqe_signal(&rising_h1(), &series_from_closes(&closes), Some(18));
        match sig {
            TfqeSignal::WaitingPullback { price, ema20, distance_pct, .. } => {
                assert!(price > ema20);
                assert!(distance_pct > 0.0);
            }
            other => panic!("expected WAITING_PULLBACK, got {other}"),
        }
    }

    #[test]
    fn quiet_downtrend_waits_for_rally() {
        let sig = detect_tfqe_signal(&falling_h1(), &m15(&flat(60)), Some(18));
        assert_eq!(sig.name(), "WAITING_RALLY");
    }

    #[test]
    fn malformed_bar_gives_invalid_risk() {
        // Low above close pushes the structural stop past the entry.
        let mut bars = flat(60);
        bars.push((150.0, 150.05, 149.85, 149.9));
        bars.push((149.85, 150.3, 150.2, 150.1));
        let sig = detect_tfqe_signal(&rising_h1(), &m15(&bars), Some(18));
        assert_eq!(sig, TfqeSignal::InvalidRisk { bias: TrendBias::Up });
    }

    #[test]
    fn serializes_with_signal_tag() {
        let sig = detect_tfqe_signal(&rising_h1(), &bullish_engulfing_entry(), Some(18));
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["signal"], "BUY");
        assert!(json["take_profit_2"].is_number());

        let out = serde_json::to_value(TfqeSignal::OutOfSession { hour: 3 }).unwrap();
        assert_eq!(out, serde_json::json!({ "signal": "OUT_OF_SESSION", "hour": 3 }));

        let back: TfqeSignal = serde_json::from_value(json).unwrap();
        assert_eq!(back.name(), "BUY");
    }

    #[test]
    fn detection_is_deterministic() {
        let (h1, entry) = (rising_h1(), bullish_engulfing_entry());
        assert_eq!(
            detect_tfqe_signal(&h1, &entry, Some(18)),
            detect_tfqe_signal(&h1, &entry, Some(18))
        );
    }
}

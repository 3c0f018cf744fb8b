// =============================================================================
// Entry-Point Selection
// =============================================================================
//
// Converts a timeframe's analysis into concrete order suggestions.  Each
// timeframe has a fixed offset table (percent of current price):
//
//   timeframe   entry   stop   target   style
//   5m          0.05    0.10   0.15     scalping pullback
//   1h          0.10    0.50   1.00     day-trading trend follow
//   4h          0.50    1.50   3.00     position trend
//   1d          1.00    3.00   5.00     swing trend
//
// BUY enters below the price with the stop below and the target above; SELL
// mirrors every offset.  HOLD yields nothing, and the 1h / 4h buckets also
// require confidence above 60.

use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;
use crate::timeframe_analysis::TimeframeAnalysis;
use crate::types::Side;

/// Minimum confidence for the gated timeframes.
pub const GATED_MIN_CONFIDENCE: f64 = 60.0;

/// One suggested order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub side: Side,
    /// Short label such as "Pullback Buy".
    pub kind: String,
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Expected holding window, e.g. "1-4 hours".
    pub holding_window: String,
    pub reason: String,
}

impl EntryPoint {
    /// Reward over risk, `None` when the stop sits on the entry.
    pub fn risk_reward(&self) -> Option<f64> {
        let risk = (self.price - self.stop_loss).abs();
        if risk <= f64::EPSILON {
            return None;
        }
        Some((self.take_profit - self.price).abs() / risk)
    }
}

/// Percentage offsets of one timeframe bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOffsets {
    pub entry_pct: f64,
    pub stop_pct: f64,
    pub target_pct: f64,
}

struct EntryRule {
    offsets: EntryOffsets,
    gated: bool,
    holding_window: &'static str,
    buy_kind: &'static str,
    sell_kind: &'static str,
    buy_reason: &'static str,
    sell_reason: &'static str,
}

fn rule_for(timeframe: Timeframe) -> EntryRule {
    match timeframe {
        Timeframe::UltraShort => EntryRule {
            offsets: EntryOffsets { entry_pct: 0.05, stop_pct: 0.1, target_pct: 0.15 },
            gated: false,
            holding_window: "1-5 minutes",
            buy_kind: "Pullback Buy",
            sell_kind: "Rally Sell",
            buy_reason: "Pullback within a short-term uptrend",
            sell_reason: "Rally within a short-term downtrend",
        },
        Timeframe::Short => EntryRule {
            offsets: EntryOffsets { entry_pct: 0.1, stop_pct: 0.5, target_pct: 1.0 },
            gated: true,
            holding_window: "1-4 hours",
            buy_kind: "Trend-Follow Buy",
            sell_kind: "Trend-Follow Sell",
            buy_reason: "1h uptrend continuation",
            sell_reason: "1h downtrend continuation",
        },
        Timeframe::Medium => EntryRule {
            offsets: EntryOffsets { entry_pct: 0.5, stop_pct: 1.5, target_pct: 3.0 },
            gated: true,
            holding_window: "3-7 days",
            buy_kind: "Medium-Term Trend Buy",
            sell_kind: "Medium-Term Trend Sell",
            buy_reason: "4h medium-term uptrend",
            sell_reason: "4h medium-term downtrend",
        },
        Timeframe::Long => EntryRule {
            offsets: EntryOffsets { entry_pct: 1.0, stop_pct: 3.0, target_pct: 5.0 },
            gated: false,
            holding_window: "1-4 weeks",
            buy_kind: "Long-Term Trend Buy",
            sell_kind: "Long-Term Trend Sell",
            buy_reason: "Daily long-term uptrend",
            sell_reason: "Daily long-term downtrend",
        },
    }
}

/// Candidate entries for one analysed timeframe.
///
/// `timeframe` selects the rule table; it normally equals
/// `analysis.timeframe`.
pub fn find_entry_points(timeframe: Timeframe, analysis: &TimeframeAnalysis) -> Vec<EntryPoint> {
    let Some(side) = Side::from_signal(analysis.signal) else {
        return Vec::new();
    };

    let rule = rule_for(timeframe);
    if rule.gated && analysis.confidence <= GATED_MIN_CONFIDENCE {
        return Vec::new();
    }

    let price = analysis.current_price;
    // BUY: entry below, stop below, target above.  SELL flips all three.
    let dir = side.direction();
    let at = |pct: f64| price * (1.0 + dir * pct / 100.0);
    let o = rule.offsets;

    let (kind, reason) = match side {
        Side::Buy => (rule.buy_kind, rule.buy_reason),
        Side::Sell => (rule.sell_kind, rule.sell_reason),
    };

    vec![EntryPoint {
        side,
        kind: kind.to_string(),
        price: at(-o.entry_pct),
        stop_loss: at(-o.stop_pct),
        take_profit: at(o.target_pct),
        holding_window: rule.holding_window.to_string(),
        reason: reason.to_string(),
    }]
}

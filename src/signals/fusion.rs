// =============================================================================
// Cross-Timeframe Fusion — Weighted aggregation of per-timeframe signals
// =============================================================================
//
//   buy_score   = sum(weight * confidence) over BUY timeframes
//   sell_score  = sum(weight * confidence) over SELL timeframes
//   total       = sum(weight) over every timeframe present
//
// A side wins when its score beats the other AND exceeds
// `total * signal_floor_per_weight`.  Its confidence is the weighted average
// (score / total) capped at `max_confidence`.  Anything else is HOLD.
//
// Daily carries the largest weight, so a lone 5m signal can confirm or nudge
// the call but cannot override the higher timeframes.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entry_points::{find_entry_points, EntryPoint};
use crate::runtime_config::FusionParams;
use crate::timeframe::Timeframe;
use crate::timeframe_analysis::TimeframeAnalysis;
use crate::types::{Priority, RiskLevel, Signal, SignalAlignment, TradingStyle};

/// Fraction of timeframes that must agree for a strong consensus.
const CONSENSUS_FRACTION: f64 = 0.75;

/// A timeframe whose own call matches the integrated signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedStrategy {
    pub timeframe: Timeframe,
    pub style: TradingStyle,
    pub confidence: f64,
    pub entry_points: Vec<EntryPoint>,
    pub priority: Priority,
}

/// Result of fusing all available timeframe analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedStrategy {
    pub integrated_signal: Signal,
    pub confidence: f64,
    pub signal_alignment: SignalAlignment,
    pub recommended_strategies: Vec<RecommendedStrategy>,
    pub risk_level: RiskLevel,
    pub buy_score: f64,
    pub sell_score: f64,
    pub total_weight: f64,
}

/// The fusion engine.  Stateless apart from its parameters.
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    params: FusionParams,
}

impl FusionEngine {
    pub fn new(params: FusionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FusionParams {
        &self.params
    }

    /// Fuse every analysed timeframe into one recommendation.
    ///
    /// Timeframes missing from `analyses` contribute no weight.  An empty map
    /// yields HOLD with `RiskLevel::Unknown`.
    pub fn fuse_timeframes(
        &self,
        analyses: &BTreeMap<Timeframe, TimeframeAnalysis>,
    ) -> IntegratedStrategy {
        let p = &self.params;

        let mut buy_score = 0.0;
        let mut sell_score = 0.0;
        let mut total_weight = 0.0;

        for (tf, analysis) in analyses {
            let weight = p.weights.weight(*tf);
            match analysis.signal {
                Signal::Buy => buy_score += weight * analysis.confidence,
                Signal::Sell => sell_score += weight * analysis.confidence,
                Signal::Hold => {}
            }
            total_weight += weight;
        }

        let floor = total_weight * p.signal_floor_per_weight;
        let (integrated_signal, confidence) = if buy_score > sell_score && buy_score > floor {
            (Signal::Buy, (buy_score / total_weight).min(p.max_confidence))
        } else if sell_score > buy_score && sell_score > floor {
            (Signal::Sell, (sell_score / total_weight).min(p.max_confidence))
        } else {
            (Signal::Hold, p.hold_confidence)
        };

        let signal_alignment = check_alignment(analyses.values().map(|a| a.signal));
        let risk_level = assess_risk(analyses.values().map(|a| a.volatility));
        let recommended_strategies = self.recommend(analyses, integrated_signal);

        debug!(
            signal = %integrated_signal,
            confidence = format!("{:.1}", confidence),
            buy_score,
            sell_score,
            total_weight,
            alignment = %signal_alignment,
            "timeframes fused"
        );

        IntegratedStrategy {
            integrated_signal,
            confidence,
            signal_alignment,
            recommended_strategies,
            risk_level,
            buy_score,
            sell_score,
            total_weight,
        }
    }

    fn recommend(
        &self,
        analyses: &BTreeMap<Timeframe, TimeframeAnalysis>,
        integrated_signal: Signal,
    ) -> Vec<RecommendedStrategy> {
        let p = &self.params;

        let mut picks: Vec<RecommendedStrategy> = analyses
            .iter()
            .filter(|(_, a)| a.signal == integrated_signal && a.confidence > p.recommend_min_confidence)
            .map(|(tf, a)| {
                let mut entry_points = find_entry_points(*tf, a);
                entry_points.truncate(p.entry_points_per_recommendation);
                RecommendedStrategy {
                    timeframe: *tf,
                    style: a.trading_style,
                    confidence: a.confidence,
                    entry_points,
                    priority: priority_for(a.confidence),
                }
            })
            .collect();

        // Stable: equal confidences keep short-to-long order.
        picks.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        picks.truncate(p.max_recommendations);
        picks
    }
}

/// Agreement classification over the individual signals.
pub fn check_alignment(signals: impl IntoIterator<Item = Signal>) -> SignalAlignment {
    let mut total = 0usize;
    let mut buys = 0usize;
    let mut sells = 0usize;
    for s in signals {
        total += 1;
        match s {
            Signal::Buy => buys += 1,
            Signal::Sell => sells += 1,
            Signal::Hold => {}
        }
    }

    if total == 0 {
        return SignalAlignment::NoConsensus;
    }
    let needed = total as f64 * CONSENSUS_FRACTION;
    if buys as f64 >= needed {
        SignalAlignment::StrongBuyConsensus
    } else if sells as f64 >= needed {
        SignalAlignment::StrongSellConsensus
    } else if buys > sells {
        SignalAlignment::BuyLean
    } else if sells > buys {
        SignalAlignment::SellLean
    } else {
        SignalAlignment::NoConsensus
    }
}

/// Risk from the mean realised volatility (percent).
pub fn assess_risk(volatilities: impl IntoIterator<Item = f64>) -> RiskLevel {
    let (sum, count) = volatilities
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return RiskLevel::Unknown;
    }
    let avg = sum / count as f64;
    if avg > 2.0 {
        RiskLevel::High
    } else if avg > 1.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn priority_for(confidence: f64) -> Priority {
    if confidence > 80.0 {
        Priority::High
    } else if confidence > 65.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeframe_analysis::{KeyLevels, SignalScores};
    use crate::types::{Momentum, SignalStrength, Trend};

    fn analysis(tf: Timeframe, signal: Signal, confidence: f64, volatility: f64) -> TimeframeAnalysis {
        TimeframeAnalysis {
            timeframe: tf,
            trading_style: tf.trading_style(),
            current_price: 150.0,
            trend: Trend::Up,
            signal,
            confidence,
            strength: SignalStrength::Strong,
            sma_short: 150.0,
            sma_long: 149.0,
            rsi: 50.0,
            momentum: Momentum::Neutral,
            volatility,
            key_levels: KeyLevels { support: 149.0, resistance: 151.0, pivot: 150.0 },
            scores: SignalScores::default(),
            bars: 200,
        }
    }

    fn map(entries: &[(Timeframe, Signal, f64)]) -> BTreeMap<Timeframe, TimeframeAnalysis> {
        entries
            .iter()
            .map(|&(tf, s, c)| (tf, analysis(tf, s, c, 0.5)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Integrated signal
    // -------------------------------------------------------------------------

    #[test]
    fn unanimous_buy_at_80() {
        let analyses = map(&[
            (Timeframe::UltraShort, Signal::Buy, 80.0),
            (Timeframe::Short, Signal::Buy, 80.0),
            (Timeframe::Medium, Signal::Buy, 80.0),
            (Timeframe::Long, Signal::Buy, 80.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Buy);
        assert!((out.confidence - 80.0).abs() < 1e-9);
        assert_eq!(out.signal_alignment, SignalAlignment::StrongBuyConsensus);
        assert_eq!(out.total_weight, 10.0);
    }

    #[test]
    fn balanced_split_is_hold() {
        // 4*60 + 1*60 == 3*60 + 2*60
        let analyses = map(&[
            (Timeframe::Long, Signal::Buy, 60.0),
            (Timeframe::UltraShort, Signal::Buy, 60.0),
            (Timeframe::Medium, Signal::Sell, 60.0),
            (Timeframe::Short, Signal::Sell, 60.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Hold);
        assert_eq!(out.confidence, 40.0);
        assert_eq!(out.signal_alignment, SignalAlignment::NoConsensus);
        assert!(out.recommended_strategies.is_empty());
    }

    #[test]
    fn weak_majority_below_floor_is_hold() {
        // buy 4*50 = 200 < 10 * 30
        let analyses = map(&[
            (Timeframe::Long, Signal::Buy, 50.0),
            (Timeframe::Medium, Signal::Hold, 50.0),
            (Timeframe::Short, Signal::Hold, 50.0),
            (Timeframe::UltraShort, Signal::Hold, 50.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Hold);
        assert_eq!(out.buy_score, 200.0);
    }

    #[test]
    fn floor_is_overridable() {
        let analyses = map(&[
            (Timeframe::Long, Signal::Buy, 50.0),
            (Timeframe::Medium, Signal::Hold, 50.0),
            (Timeframe::Short, Signal::Hold, 50.0),
            (Timeframe::UltraShort, Signal::Hold, 50.0),
        ]);
        let params = FusionParams {
            signal_floor_per_weight: 15.0,
            ..FusionParams::default()
        };
        let out = FusionEngine::new(params).fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Buy);
        assert!((out.confidence - 20.0).abs() < 1e-9);
    }

    #[test]
    fn short_timeframe_cannot_override_long() {
        let analyses = map(&[
            (Timeframe::Long, Signal::Sell, 70.0),
            (Timeframe::Medium, Signal::Sell, 60.0),
            (Timeframe::UltraShort, Signal::Buy, 95.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Sell);
        assert_eq!(out.total_weight, 8.0);
    }

    #[test]
    fn empty_input_is_hold_with_unknown_risk() {
        let out = FusionEngine::default().fuse_timeframes(&BTreeMap::new());
        assert_eq!(out.integrated_signal, Signal::Hold);
        assert_eq!(out.confidence, 40.0);
        assert_eq!(out.signal_alignment, SignalAlignment::NoConsensus);
        assert_eq!(out.risk_level, RiskLevel::Unknown);
        assert!(out.recommended_strategies.is_empty());
    }

    #[test]
    fn confidence_capped() {
        let params = FusionParams {
            max_confidence: 70.0,
            ..FusionParams::default()
        };
        let analyses = map(&[(Timeframe::Long, Signal::Sell, 90.0)]);
        let out = FusionEngine::new(params).fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Sell);
        assert_eq!(out.confidence, 70.0);
    }

    // -------------------------------------------------------------------------
    // Alignment / risk / recommendations
    // -------------------------------------------------------------------------

    #[test]
    fn alignment_buckets() {
        use Signal::*;
        assert_eq!(check_alignment([Buy, Buy, Buy, Sell]), SignalAlignment::StrongBuyConsensus);
        assert_eq!(check_alignment([Sell, Sell, Sell, Hold]), SignalAlignment::StrongSellConsensus);
        assert_eq!(check_alignment([Buy, Buy, Sell, Hold]), SignalAlignment::BuyLean);
        assert_eq!(check_alignment([Sell, Hold, Hold, Hold]), SignalAlignment::SellLean);
        assert_eq!(check_alignment([Hold, Hold]), SignalAlignment::NoConsensus);
        assert_eq!(check_alignment(Vec::new()), SignalAlignment::NoConsensus);
    }

    #[test]
    fn risk_buckets() {
        assert_eq!(assess_risk([0.2, 0.4]), RiskLevel::Low);
        assert_eq!(assess_risk([1.0, 1.4]), RiskLevel::Medium);
        assert_eq!(assess_risk([3.0, 1.5]), RiskLevel::High);
        assert_eq!(assess_risk(Vec::<f64>::new()), RiskLevel::Unknown);
    }

    #[test]
    fn recommendations_ranked_and_capped() {
        let analyses = map(&[
            (Timeframe::UltraShort, Signal::Buy, 70.0),
            (Timeframe::Short, Signal::Buy, 85.0),
            (Timeframe::Medium, Signal::Buy, 66.0),
            (Timeframe::Long, Signal::Buy, 90.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        let order: Vec<Timeframe> = out.recommended_strategies.iter().map(|r| r.timeframe).collect();
        assert_eq!(order, vec![Timeframe::Long, Timeframe::Short, Timeframe::UltraShort]);
        assert_eq!(out.recommended_strategies[0].priority, Priority::High);
        assert_eq!(out.recommended_strategies[2].priority, Priority::Medium);
        for rec in &out.recommended_strategies {
            assert!(rec.entry_points.len() <= 2);
            assert!(!rec.entry_points.is_empty());
        }
    }

    #[test]
    fn recommendations_skip_opposing_and_low_confidence() {
        let analyses = map(&[
            (Timeframe::Long, Signal::Buy, 90.0),
            (Timeframe::Medium, Signal::Buy, 65.0),
            (Timeframe::Short, Signal::Sell, 90.0),
        ]);
        let out = FusionEngine::default().fuse_timeframes(&analyses);
        assert_eq!(out.integrated_signal, Signal::Buy);
        assert_eq!(out.recommended_strategies.len(), 1);
        assert_eq!(out.recommended_strategies[0].timeframe, Timeframe::Long);
    }

    #[test]
    fn priority_thresholds() {
        assert_eq!(priority_for(80.5), Priority::High);
        assert_eq!(priority_for(80.0), Priority::Medium);
        assert_eq!(priority_for(65.0), Priority::Low);
    }
}

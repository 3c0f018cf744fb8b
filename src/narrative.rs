// =============================================================================
// Narrative
// =============================================================================
//
// Human-readable commentary attached to a market report.  A narrator only
// describes the fused result; it has no way to alter it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;

use crate::signals::IntegratedStrategy;
use crate::timeframe::Timeframe;
use crate::timeframe_analysis::TimeframeAnalysis;

pub trait Narrator: Send + Sync {
    fn narrate(
        &self,
        analyses: &BTreeMap<Timeframe, TimeframeAnalysis>,
        strategy: &IntegratedStrategy,
    ) -> Result<String>;
}

/// Deterministic plain-text digest of the fused result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryNarrator;

impl Narrator for SummaryNarrator {
    fn narrate(
        &self,
        analyses: &BTreeMap<Timeframe, TimeframeAnalysis>,
        strategy: &IntegratedStrategy,
    ) -> Result<String> {
        let mut out = String::new();
        writeln!(
            out,
            "Overall {} at {:.1}% confidence ({}, risk {}).",
            strategy.integrated_signal,
            strategy.confidence,
            strategy.signal_alignment,
            strategy.risk_level
        )?;

        for (tf, a) in analyses {
            writeln!(
                out,
                "  {:>3}: {} {:.1}% | trend {} | RSI {:.1} | momentum {}",
                tf.as_str(),
                a.signal,
                a.confidence,
                a.trend,
                a.rsi,
                a.momentum
            )?;
        }

        match strategy.recommended_strategies.first() {
            Some(top) => write!(
                out,
                "Focus on {} ({}), priority {}.",
                top.style,
                top.timeframe.as_str(),
                top.priority
            )?,
            None => write!(out, "No timeframe is strong enough to act on.")?,
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::candle::series_from_closes;
    use crate::signals::FusionEngine;
    use crate::timeframe_analysis::analyze_timeframe;

    #[test]
    fn summary_mentions_every_timeframe() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let series = series_from_closes(&closes);
        let analyses: BTreeMap<_, _> = Timeframe::ALL
            .into_iter()
            .map(|tf| (tf, analyze_timeframe(&series, tf).unwrap()))
            .collect();
        let strategy = FusionEngine::default().fuse_timeframes(&analyses);

        let text = SummaryNarrator.narrate(&analyses, &strategy).unwrap();
        assert!(text.starts_with(&format!("Overall {}", strategy.integrated_signal)));
        for tf in Timeframe::ALL {
            assert!(text.contains(&format!("{:>3}:", tf.as_str())), "missing {tf}");
        }
        assert_eq!(text, SummaryNarrator.narrate(&analyses, &strategy).unwrap());
    }

    #[test]
    fn empty_input_still_narrates() {
        let strategy = FusionEngine::default().fuse_timeframes(&BTreeMap::new());
        let text = SummaryNarrator.narrate(&BTreeMap::new(), &strategy).unwrap();
        assert!(text.contains("No timeframe"));
    }
}

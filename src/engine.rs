// =============================================================================
// Analysis Engine — Per-symbol orchestration
// =============================================================================
//
// Multi-timeframe report pipeline:
//   1. Fetch each timeframe's series (lookback per timeframe)
//   2. Analyse it; record unavailable timeframes with the reason
//   3. Select entry points, attach profile and forecast
//   4. Fuse every analysed timeframe
//   5. Assess market timing at the configured local offset
//   6. Optional narrative (a failure never affects the fused result)
//
// TFQE pipeline:
//   1. Fetch H1 and the entry series (M15, falling back to M5)
//   2. Derive the local hour from the configured UTC offset
//   3. Run the TFQE procedure
//
// Data problems are logged at warn and degrade the report; they never abort it.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use tracing::{info, warn};

use crate::entry_points::find_entry_points;
use crate::forecast::forecast_next_move;
use crate::market_data::{Interval, Series, SeriesSource};
use crate::market_timing::assess_market_timing;
use crate::narrative::{Narrator, SummaryNarrator};
use crate::report::{MarketReport, TfqeReport, TimeframeReport};
use crate::runtime_config::EngineConfig;
use crate::signals::FusionEngine;
use crate::tfqe::TfqeStrategy;
use crate::timeframe::Timeframe;
use crate::timeframe_analysis::{analyze_timeframe, TimeframeAnalysis};

pub struct AnalysisEngine<S: SeriesSource> {
    config: EngineConfig,
    source: S,
    fusion: FusionEngine,
    tfqe: TfqeStrategy,
    narrator: Box<dyn Narrator>,
}

impl<S: SeriesSource> AnalysisEngine<S> {
    pub fn new(config: EngineConfig, source: S) -> Self {
        let fusion = FusionEngine::new(config.fusion.clone());
        let tfqe = TfqeStrategy::new(config.tfqe.clone());
        Self {
            config,
            source,
            fusion,
            tfqe,
            narrator: Box::new(SummaryNarrator),
        }
    }

    pub fn with_narrator(mut self, narrator: impl Narrator + 'static) -> Self {
        self.narrator = Box::new(narrator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Configured local offset; out-of-range values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.config.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    // =========================================================================
    // Multi-timeframe report
    // =========================================================================

    pub fn analyze_symbol(&self, symbol: &str) -> MarketReport {
        self.analyze_symbol_at(symbol, Utc::now())
    }

    /// Same as [`analyze_symbol`](Self::analyze_symbol) with an explicit clock
    /// for market timing.
    pub fn analyze_symbol_at(&self, symbol: &str, now: DateTime<Utc>) -> MarketReport {
        let mut timeframes = BTreeMap::new();
        let mut analyses: BTreeMap<Timeframe, TimeframeAnalysis> = BTreeMap::new();

        for tf in Timeframe::ALL {
            let days = self.config.lookback_days.days(tf);
            let series = match self.source.fetch_series(symbol, tf.interval(), days) {
                Ok(series) => series,
                Err(e) => {
                    warn!(symbol, timeframe = %tf, error = %e, "series fetch failed");
                    timeframes.insert(
                        tf,
                        TimeframeReport::Unavailable {
                            reason: format!("fetch failed: {e:#}"),
                        },
                    );
                    continue;
                }
            };

            match analyze_timeframe(&series, tf) {
                Ok(analysis) => {
                    timeframes.insert(
                        tf,
                        TimeframeReport::Analyzed {
                            entry_points: find_entry_points(tf, &analysis),
                            profile: tf.profile(),
                            forecast: forecast_next_move(&analysis),
                            analysis: analysis.clone(),
                        },
                    );
                    analyses.insert(tf, analysis);
                }
                Err(e) => {
                    warn!(symbol, timeframe = %tf, bars = e.bars, "insufficient data");
                    timeframes.insert(tf, TimeframeReport::Unavailable { reason: e.to_string() });
                }
            }
        }

        let integrated = self.fusion.fuse_timeframes(&analyses);
        let market_timing = assess_market_timing(now.with_timezone(&self.local_offset()));

        let narrative = if self.config.enable_narrative {
            match self.narrator.narrate(&analyses, &integrated) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(symbol, error = %e, "narrative generation failed");
                    None
                }
            }
        } else {
            None
        };

        let report = MarketReport::new(symbol, timeframes, integrated, market_timing, narrative);
        info!(
            symbol,
            id = %report.id,
            signal = %report.integrated.integrated_signal,
            confidence = format!("{:.1}", report.integrated.confidence),
            analyzed = report.analyzed_count(),
            "market report complete"
        );
        report
    }

    // =========================================================================
    // TFQE
    // =========================================================================

    pub fn evaluate_tfqe(&self, symbol: &str) -> TfqeReport {
        self.evaluate_tfqe_at(symbol, Utc::now())
    }

    pub fn evaluate_tfqe_at(&self, symbol: &str, now: DateTime<Utc>) -> TfqeReport {
        let params = self.tfqe.params();

        let h1 = self
            .fetch_or_warn(symbol, Interval::H1, params.h1_lookback_days)
            .unwrap_or_default();
        let (entry_interval, entry) = self.fetch_entry_series(symbol, params.entry_lookback_days);

        let hour = now.with_timezone(&self.local_offset()).hour();
        let signal = self.tfqe.detect(&h1, &entry, Some(hour));

        let report = TfqeReport::new(symbol, h1.len(), entry_interval, entry.len(), signal);
        info!(
            symbol,
            id = %report.id,
            signal = %report.signal,
            hour,
            entry_interval = ?report.entry_interval,
            "TFQE evaluation complete"
        );
        report
    }

    /// M15 when it has bars, otherwise M5.
    fn fetch_entry_series(&self, symbol: &str, days: u32) -> (Option<Interval>, Series) {
        if let Some(series) = self.fetch_or_warn(symbol, Interval::M15, days) {
            if !series.is_empty() {
                return (Some(Interval::M15), series);
            }
        }
        warn!(symbol, "no 15m bars, falling back to 5m");
        match self.fetch_or_warn(symbol, Interval::M5, days) {
            Some(series) if !series.is_empty() => (Some(Interval::M5), series),
            _ => (None, Series::new()),
        }
    }

    fn fetch_or_warn(&self, symbol: &str, interval: Interval, days: u32) -> Option<Series> {
        match self.source.fetch_series(symbol, interval, days) {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(symbol, %interval, error = %e, "series fetch failed");
                None
            }
        }
    }
}

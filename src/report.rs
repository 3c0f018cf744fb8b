// =============================================================================
// Reports — Serializable records of each analysis run
// =============================================================================
//
// Every run produces one record with a UUID v4 and a creation timestamp so
// that output lines can be correlated and audited after the fact.  Missing
// timeframes are recorded with the reason instead of being dropped silently.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry_points::EntryPoint;
use crate::forecast::Forecast;
use crate::market_data::Interval;
use crate::market_timing::MarketTiming;
use crate::signals::IntegratedStrategy;
use crate::tfqe::TfqeSignal;
use crate::timeframe::{Timeframe, TimeframeProfile};
use crate::timeframe_analysis::TimeframeAnalysis;

/// Outcome for one timeframe of a market report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeReport {
    Analyzed {
        analysis: TimeframeAnalysis,
        entry_points: Vec<EntryPoint>,
        profile: TimeframeProfile,
        forecast: Forecast,
    },
    Unavailable {
        reason: String,
    },
}

impl TimeframeReport {
    pub fn analysis(&self) -> Option<&TimeframeAnalysis> {
        match self {
            Self::Analyzed { analysis, .. } => Some(analysis),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Multi-timeframe analysis of one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    /// Unique identifier for this run (UUID v4).
    pub id: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub timeframes: BTreeMap<Timeframe, TimeframeReport>,
    pub integrated: IntegratedStrategy,
    pub market_timing: MarketTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl MarketReport {
    pub fn new(
        symbol: impl Into<String>,
        timeframes: BTreeMap<Timeframe, TimeframeReport>,
        integrated: IntegratedStrategy,
        market_timing: MarketTiming,
        narrative: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            created_at: Utc::now(),
            timeframes,
            integrated,
            market_timing,
            narrative,
        }
    }

    /// Number of timeframes that produced an analysis.
    pub fn analyzed_count(&self) -> usize {
        self.timeframes
            .values()
            .filter(|t| t.analysis().is_some())
            .count()
    }
}

/// One TFQE evaluation of a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfqeReport {
    pub id: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub h1_bars: usize,
    /// Interval of the entry series actually used (M15, or M5 on fallback).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_interval: Option<Interval>,
    pub entry_bars: usize,
    pub signal: TfqeSignal,
}

impl TfqeReport {
    pub fn new(
        symbol: impl Into<String>,
        h1_bars: usize,
        entry_interval: Option<Interval>,
        entry_bars: usize,
        signal: TfqeSignal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            created_at: Utc::now(),
            h1_bars,
            entry_interval,
            entry_bars,
            signal,
        }
    }
}

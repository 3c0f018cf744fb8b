// =============================================================================
// Runtime Configuration — Engine settings with atomic save
// =============================================================================
//
// Central configuration hub for the confluence engine.  Every tunable
// threshold of the fusion engine and the TFQE procedure lives here, next to
// the operational settings of the evaluation loop.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::timeframe::Timeframe;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_symbols() -> Vec<String> {
    vec![
        "USD_JPY".to_string(),
        "EUR_USD".to_string(),
        "EUR_JPY".to_string(),
        "GBP_JPY".to_string(),
    ]
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_eval_interval_secs() -> u64 {
    300
}

fn default_analysis_timeout_secs() -> u64 {
    30
}

fn default_signal_floor_per_weight() -> f64 {
    30.0
}

fn default_hold_confidence() -> f64 {
    40.0
}

fn default_max_confidence() -> f64 {
    95.0
}

fn default_recommend_min_confidence() -> f64 {
    65.0
}

fn default_max_recommendations() -> usize {
    3
}

fn default_entry_points_per_recommendation() -> usize {
    2
}

fn default_session_start_hour() -> u32 {
    16
}

fn default_session_end_hour() -> u32 {
    24
}

fn default_adx_threshold() -> f64 {
    20.0
}

fn default_ema_touch_buffer() -> f64 {
    0.002
}

fn default_stop_buffer() -> f64 {
    0.02
}

fn default_atr_stop_multiplier() -> f64 {
    0.8
}

fn default_tp1_risk_multiple() -> f64 {
    1.0
}

fn default_tp2_risk_multiple() -> f64 {
    2.5
}

fn default_pip_multiplier() -> f64 {
    100.0
}

fn default_tfqe_confidence() -> f64 {
    75.0
}

fn default_h1_lookback_days() -> u32 {
    365
}

fn default_entry_lookback_days() -> u32 {
    90
}

// =============================================================================
// Per-timeframe tables
// =============================================================================

/// Fusion weight per timeframe.  Longer horizons anchor the integrated call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeframeWeights {
    #[serde(rename = "5m")]
    pub ultra_short: f64,
    #[serde(rename = "1h")]
    pub short: f64,
    #[serde(rename = "4h")]
    pub medium: f64,
    #[serde(rename = "1d")]
    pub long: f64,
}

impl TimeframeWeights {
    pub fn weight(&self, timeframe: Timeframe) -> f64 {
        match timeframe {
            Timeframe::UltraShort => self.ultra_short,
            Timeframe::Short => self.short,
            Timeframe::Medium => self.medium,
            Timeframe::Long => self.long,
        }
    }
}

impl Default for TimeframeWeights {
    fn default() -> Self {
        Self {
            ultra_short: 1.0,
            short: 2.0,
            medium: 3.0,
            long: 4.0,
        }
    }
}

/// History requested per analysis timeframe, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookbackDays {
    #[serde(rename = "5m")]
    pub ultra_short: u32,
    #[serde(rename = "1h")]
    pub short: u32,
    #[serde(rename = "4h")]
    pub medium: u32,
    #[serde(rename = "1d")]
    pub long: u32,
}

impl LookbackDays {
    pub fn days(&self, timeframe: Timeframe) -> u32 {
        match timeframe {
            Timeframe::UltraShort => self.ultra_short,
            Timeframe::Short => self.short,
            Timeframe::Medium => self.medium,
            Timeframe::Long => self.long,
        }
    }
}

impl Default for LookbackDays {
    fn default() -> Self {
        Self {
            ultra_short: 7,
            short: 30,
            medium: 180,
            long: 365,
        }
    }
}

// =============================================================================
// FusionParams
// =============================================================================

/// Tunable parameters of the cross-timeframe fusion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionParams {
    #[serde(default)]
    pub weights: TimeframeWeights,

    /// A side wins only if its score exceeds `total_weight` times this
    /// value.  Empirical; kept overridable.
    #[serde(default = "default_signal_floor_per_weight")]
    pub signal_floor_per_weight: f64,

    /// Confidence reported for an integrated HOLD.
    #[serde(default = "default_hold_confidence")]
    pub hold_confidence: f64,

    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,

    /// Timeframes must beat this confidence to be recommended.
    #[serde(default = "default_recommend_min_confidence")]
    pub recommend_min_confidence: f64,

    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    #[serde(default = "default_entry_points_per_recommendation")]
    pub entry_points_per_recommendation: usize,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            weights: TimeframeWeights::default(),
            signal_floor_per_weight: default_signal_floor_per_weight(),
            hold_confidence: default_hold_confidence(),
            max_confidence: default_max_confidence(),
            recommend_min_confidence: default_recommend_min_confidence(),
            max_recommendations: default_max_recommendations(),
            entry_points_per_recommendation: default_entry_points_per_recommendation(),
        }
    }
}

// =============================================================================
// TfqeParams
// =============================================================================

/// Tunable parameters of the TFQE trend-filter / entry-trigger procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfqeParams {
    /// First local hour of the trading window (inclusive).
    #[serde(default = "default_session_start_hour")]
    pub session_start_hour: u32,

    /// End of the trading window (exclusive, 24 = midnight).
    #[serde(default = "default_session_end_hour")]
    pub session_end_hour: u32,

    /// H1 ADX(14) must be at least this for a trend bias.
    #[serde(default = "default_adx_threshold")]
    pub adx_threshold: f64,

    /// A bar "touches" EMA20 within this fraction of it.
    #[serde(default = "default_ema_touch_buffer")]
    pub ema_touch_buffer: f64,

    /// Price units beyond the bar extreme for the structural stop.
    #[serde(default = "default_stop_buffer")]
    pub stop_buffer: f64,

    #[serde(default = "default_atr_stop_multiplier")]
    pub atr_stop_multiplier: f64,

    #[serde(default = "default_tp1_risk_multiple")]
    pub tp1_risk_multiple: f64,

    #[serde(default = "default_tp2_risk_multiple")]
    pub tp2_risk_multiple: f64,

    /// Price-to-pip factor (100 for JPY crosses).
    #[serde(default = "default_pip_multiplier")]
    pub pip_multiplier: f64,

    #[serde(default = "default_tfqe_confidence")]
    pub confidence: f64,

    #[serde(default = "default_h1_lookback_days")]
    pub h1_lookback_days: u32,

    #[serde(default = "default_entry_lookback_days")]
    pub entry_lookback_days: u32,
}

impl TfqeParams {
    /// Half-open `[start, end)`; a window with `start > end` wraps midnight.
    pub fn in_session(&self, hour: u32) -> bool {
        let (start, end) = (self.session_start_hour, self.session_end_hour);
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }
}

impl Default for TfqeParams {
    fn default() -> Self {
        Self {
            session_start_hour: default_session_start_hour(),
            session_end_hour: default_session_end_hour(),
            adx_threshold: default_adx_threshold(),
            ema_touch_buffer: default_ema_touch_buffer(),
            stop_buffer: default_stop_buffer(),
            atr_stop_multiplier: default_atr_stop_multiplier(),
            tp1_risk_multiple: default_tp1_risk_multiple(),
            tp2_risk_multiple: default_tp2_risk_multiple(),
            pip_multiplier: default_pip_multiplier(),
            confidence: default_tfqe_confidence(),
            h1_lookback_days: default_h1_lookback_days(),
            entry_lookback_days: default_entry_lookback_days(),
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the confluence engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Data ----------------------------------------------------------------

    /// Currency pairs evaluated on every cycle.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Directory holding `<SYMBOL>_<interval>.json` candle files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub lookback_days: LookbackDays,

    // --- Clock & loop -------------------------------------------------------

    /// Offset of the local trading clock from UTC (JST by default).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_eval_interval_secs")]
    pub eval_interval_secs: u64,

    /// Deadline for one symbol's evaluation.
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,

    // --- Features -----------------------------------------------------------

    /// Run the TFQE procedure alongside the multi-timeframe report.
    #[serde(default = "default_true")]
    pub enable_tfqe: bool,

    /// Attach a plain-text narrative to each report.
    #[serde(default = "default_true")]
    pub enable_narrative: bool,

    // --- Strategy parameters ------------------------------------------------

    #[serde(default)]
    pub fusion: FusionParams,

    #[serde(default)]
    pub tfqe: TfqeParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            data_dir: default_data_dir(),
            lookback_days: LookbackDays::default(),
            utc_offset_hours: default_utc_offset_hours(),
            eval_interval_secs: default_eval_interval_secs(),
            analysis_timeout_secs: default_analysis_timeout_secs(),
            enable_tfqe: true,
            enable_narrative: true,
            fusion: FusionParams::default(),
            tfqe: TfqeParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            data_dir = %config.data_dir.display(),
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}

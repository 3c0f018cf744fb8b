// =============================================================================
// FX Confluence — Multi-timeframe signal fusion for FX pairs
// =============================================================================
//
// Layers, bottom to top:
//   indicators          pure technical indicators
//   market_data         candles, series, cache and series sources
//   timeframe_analysis  one series -> normalised per-timeframe analysis
//   entry_points        per-timeframe entry / stop / target levels
//   signals             cross-timeframe fusion and single-series confluence
//   tfqe                H1 trend filter + 15m entry trigger
//   forecast, market_timing, narrative
//   engine, report      per-symbol orchestration and serializable output
// =============================================================================

pub mod engine;
pub mod entry_points;
pub mod forecast;
pub mod indicators;
pub mod market_data;
pub mod market_timing;
pub mod narrative;
pub mod report;
pub mod runtime_config;
pub mod signals;
pub mod tfqe;
pub mod timeframe;
pub mod timeframe_analysis;
pub mod types;

pub use engine::AnalysisEngine;
pub use runtime_config::EngineConfig;
pub use tfqe::{detect_tfqe_signal, TfqeSignal};
pub use timeframe::Timeframe;
pub use timeframe_analysis::{analyze_timeframe, TimeframeAnalysis};

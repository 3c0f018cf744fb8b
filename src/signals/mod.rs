// =============================================================================
// Signals Module
// =============================================================================
//
// Signal aggregation across timeframes:
// - Weighted cross-timeframe fusion (longer timeframes weigh more)
// - Single-series confluence outlook (MA / MACD / oscillator scoring)

pub mod confluence;
pub mod fusion;

pub use confluence::{confluence_outlook, ConfluenceOutlook};
pub use fusion::{FusionEngine, IntegratedStrategy, RecommendedStrategy};

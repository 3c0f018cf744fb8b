pub mod candle;
pub mod candle_cache;
pub mod source;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{Candle, Interval, Series};
pub use candle_cache::{CandleCache, SeriesKey};
pub use source::{CachedSource, JsonFileSource, SeriesSource};

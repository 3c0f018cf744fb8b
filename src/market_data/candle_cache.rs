use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::candle::{Candle, Interval, Series};

/// Composite key that identifies a unique candle series.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub interval: Interval,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.interval)
    }
}

// ---------------------------------------------------------------------------
// CandleCache -- thread-safe series store per (symbol, interval)
// ---------------------------------------------------------------------------

/// Thread-safe store of fetched candle series keyed by `(symbol, interval)`.
///
/// The cache is an explicit object shared by handle (`Arc<CandleCache>`)
/// with the fetching layer.  Analysis code only ever sees cloned `Series`
/// snapshots, never the cache itself.
#[derive(Default)]
pub struct CandleCache {
    series: RwLock<HashMap<SeriesKey, Series>>,
}

impl CandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `candles` into the stored series for `key` (last-write-wins on
    /// duplicate timestamps) and drop bars more than `lookback` older than the
    /// newest merged candle.
    pub fn merge(&self, key: SeriesKey, candles: Vec<Candle>, lookback: Option<Duration>) {
        let mut map = self.series.write();
        let series = map.entry(key).or_default();
        series.merge(candles);
        let newest = series.last().map(|c| c.timestamp);
        if let (Some(window), Some(newest)) = (lookback, newest) {
            series.retain_since(newest - window);
        }
    }

    /// Snapshot of the stored series, if any.
    pub fn get(&self, key: &SeriesKey) -> Option<Series> {
        self.series.read().get(key).cloned()
    }

    /// Timestamp of the newest stored candle.
    pub fn last_timestamp(&self, key: &SeriesKey) -> Option<DateTime<Utc>> {
        self.series
            .read()
            .get(key)
            .and_then(|s| s.last().map(|c| c.timestamp))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle(hour: i64, close: f64) -> Candle {
        Candle {
            timestamp: DateTime::<Utc>::UNIX_EPOCH + Duration::hours(hour),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: None,
        }
    }

    fn make_key(sym: &str, iv: Interval) -> SeriesKey {
        SeriesKey::new(sym, iv)
    }

    #[test]
    fn merge_trims_relative_to_newest_bar() {
        let cache = CandleCache::new();
        let key = make_key("USD_JPY", Interval::H1);
        let candles = (0..5).map(|h| sample_candle(h, 100.0 + h as f64)).collect();

        cache.merge(key.clone(), candles, Some(Duration::hours(2)));

        assert_eq!(cache.get(&key).unwrap().closes(), vec![102.0, 103.0, 104.0]);
    }

    #[test]
    fn old_history_survives_lookback() {
        let cache = CandleCache::new();
        let key = make_key("USD_JPY", Interval::D1);
        let start = DateTime::parse_from_rfc3339("2019-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let candles = (0..10)
            .map(|d| Candle {
                timestamp: start + Duration::days(d),
                ..sample_candle(0, 1.0)
            })
            .collect();

        cache.merge(key.clone(), candles, Some(Duration::days(30)));

        assert_eq!(cache.get(&key).map_or(0, |s| s.len()), 10);
    }

    #[test]
    fn later_merge_replaces_same_timestamp() {
        let cache = CandleCache::new();
        let key = make_key("EUR_USD", Interval::M5);

        cache.merge(key.clone(), vec![sample_candle(0, 50.0)], None);
        cache.merge(key.clone(), vec![sample_candle(0, 51.0)], None);

        let series = cache.get(&key).unwrap();
        assert_eq!(series.closes(), vec![51.0]);
        assert_eq!(
            cache.last_timestamp(&key),
            Some(DateTime::<Utc>::UNIX_EPOCH)
        );
    }

    #[test]
    fn keys_are_independent() {
        let cache = CandleCache::new();
        cache.merge(make_key("USD_JPY", Interval::H1), vec![sample_candle(0, 1.0)], None);
        assert!(cache.get(&make_key("USD_JPY", Interval::H4)).is_none());
        assert!(cache.last_timestamp(&make_key("EUR_JPY", Interval::H1)).is_none());
    }

    #[test]
    fn key_display() {
        assert_eq!(make_key("USD_JPY", Interval::H4).to_string(), "USD_JPY@4h");
    }
}

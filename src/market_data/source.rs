use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, warn};

use super::candle::{Candle, Interval, Series};
use super::candle_cache::{CandleCache, SeriesKey};

// ---------------------------------------------------------------------------
// SeriesSource -- the fetch seam
// ---------------------------------------------------------------------------

/// Anything that can produce a candle series for a symbol.
///
/// Implementations must return candles sorted ascending and de-duplicated
/// (constructing a [`Series`] guarantees both) and may return fewer bars than
/// requested, including none.  Retrying is the implementation's business.
pub trait SeriesSource: Send + Sync {
    fn fetch_series(&self, symbol: &str, interval: Interval, lookback_days: u32) -> Result<Series>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for Arc<S> {
    fn fetch_series(&self, symbol: &str, interval: Interval, lookback_days: u32) -> Result<Series> {
        (**self).fetch_series(symbol, interval, lookback_days)
    }
}

// ---------------------------------------------------------------------------
// JsonFileSource
// ---------------------------------------------------------------------------

/// Reads `<data_dir>/<SYMBOL>_<interval>.json`.
///
/// The file holds a JSON array of bars.  Two shapes are accepted per element:
/// the native [`Candle`] form (`timestamp` RFC 3339, numeric prices) and the
/// exchange kline form (`openTime` epoch milliseconds, prices as strings).
pub struct JsonFileSource {
    data_dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.json", symbol.to_uppercase(), interval.as_str()))
    }
}

impl SeriesSource for JsonFileSource {
    fn fetch_series(&self, symbol: &str, interval: Interval, lookback_days: u32) -> Result<Series> {
        let path = self.path_for(symbol, interval);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read candle file {}", path.display()))?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse candle file {}", path.display()))?;

        let candles = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                parse_candle(row).with_context(|| format!("bad bar #{i} in {}", path.display()))
            })
            .collect::<Result<Vec<Candle>>>()?;

        let mut series = Series::from_candles(candles);
        if let Some(last) = series.last().map(|c| c.timestamp) {
            series.retain_since(last - Duration::days(i64::from(lookback_days)));
        }

        debug!(
            symbol = %symbol,
            interval = %interval,
            bars = series.len(),
            "loaded candle file"
        );
        Ok(series)
    }
}

fn parse_candle(row: &serde_json::Value) -> Result<Candle> {
    if row.get("timestamp").is_some() {
        return serde_json::from_value(row.clone()).context("invalid candle object");
    }

    let open_time_ms = match &row["openTime"] {
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .with_context(|| format!("failed to parse openTime as i64: {s}"))?,
        serde_json::Value::Number(n) => n.as_i64().context("openTime is not an integer")?,
        _ => anyhow::bail!("missing field openTime"),
    };
    let timestamp = Utc
        .timestamp_millis_opt(open_time_ms)
        .single()
        .with_context(|| format!("openTime out of range: {open_time_ms}"))?;

    let volume = match row.get("volume") {
        Some(v) if !v.is_null() => Some(parse_string_f64(v, "volume")?),
        _ => None,
    };

    Ok(Candle {
        timestamp,
        open: parse_string_f64(&row["open"], "open")?,
        high: parse_string_f64(&row["high"], "high")?,
        low: parse_string_f64(&row["low"], "low")?,
        close: parse_string_f64(&row["close"], "close")?,
        volume,
    })
}

/// Exchange klines carry numeric values as JSON strings.
fn parse_string_f64(val: &serde_json::Value, name: &str) -> Result<f64> {
    match val {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64")),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    }
}

// ---------------------------------------------------------------------------
// CachedSource -- read-through cache in front of another source
// ---------------------------------------------------------------------------

/// Serves series from a shared [`CandleCache`] and refreshes from `inner`
/// once a new candle is due.
///
/// A stored series is fresh while `now < last_timestamp + interval`.  Stale or
/// missing series are fetched, merged last-write-wins and trimmed to the
/// lookback window measured back from the newest merged candle.  A failed refresh falls back to the stored series.
pub struct CachedSource<S> {
    inner: S,
    cache: Arc<CandleCache>,
}

impl<S: SeriesSource> CachedSource<S> {
    pub fn new(inner: S, cache: Arc<CandleCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<CandleCache> {
        &self.cache
    }

    /// Same as [`SeriesSource::fetch_series`] with an explicit clock.
    pub fn fetch_series_at(
        &self,
        symbol: &str,
        interval: Interval,
        lookback_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Series> {
        let key = SeriesKey::new(symbol, interval);

        if let Some(last) = self.cache.last_timestamp(&key) {
            if now < last + interval.duration() {
                if let Some(series) = self.cache.get(&key) {
                    debug!(key = %key, bars = series.len(), "candle cache hit");
                    return Ok(series);
                }
            }
        }

        match self.inner.fetch_series(symbol, interval, lookback_days) {
            Ok(fresh) => {
                let lookback = Duration::days(i64::from(lookback_days));
                self.cache.merge(key.clone(), fresh.into(), Some(lookback));
                Ok(self.cache.get(&key).unwrap_or_default())
            }
            Err(e) => match self.cache.get(&key) {
                Some(stale) => {
                    warn!(key = %key, error = %e, "refresh failed, serving cached series");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }
}

impl<S: SeriesSource> SeriesSource for CachedSource<S> {
    fn fetch_series(&self, symbol: &str, interval: Interval, lookback_days: u32) -> Result<Series> {
        self.fetch_series_at(symbol, interval, lookback_days, Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

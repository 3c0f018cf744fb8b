use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLC(V) bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Bucket duration of a candle series as requested from a data source.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::M5 => Duration::minutes(5),
            Self::M15 => Duration::minutes(15),
            Self::H1 => Duration::hours(1),
            Self::H4 => Duration::hours(4),
            Self::D1 => Duration::days(1),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Series -- ordered, de-duplicated candles for one (symbol, interval)
// ---------------------------------------------------------------------------

/// Candles for one `(symbol, interval)` pair.
///
/// Invariant: timestamps are strictly increasing.  Every constructor and
/// mutator restores it; duplicate timestamps resolve last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Candle>", into = "Vec<Candle>")]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from candles in any order.
    pub fn from_candles(candles: Vec<Candle>) -> Self {
        let mut series = Self::new();
        series.merge(candles);
        series
    }

    /// Merge newly ingested candles.  A candle whose timestamp already exists
    /// replaces the stored one; among duplicates inside `incoming`, the later
    /// element wins.
    pub fn merge(&mut self, incoming: Vec<Candle>) {
        if incoming.is_empty() {
            return;
        }
        let mut all = std::mem::take(&mut self.candles);
        all.extend(incoming);
        // Stable sort keeps arrival order among equal timestamps.
        all.sort_by_key(|c| c.timestamp);

        let mut deduped: Vec<Candle> = Vec::with_capacity(all.len());
        for candle in all {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }
        self.candles = deduped;
    }

    /// Drop candles strictly older than `cutoff`.
    pub fn retain_since(&mut self, cutoff: DateTime<Utc>) {
        self.candles.retain(|c| c.timestamp >= cutoff);
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

impl From<Vec<Candle>> for Series {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_candles(candles)
    }
}

impl From<Series> for Vec<Candle> {
    fn from(series: Series) -> Self {
        series.candles
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn test_candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
        open,
        high,
        low,
        close,
        volume: None,
    }
}

/// Hourly series built from `(open, high, low, close)` tuples starting at the
/// Unix epoch.
#[cfg(test)]
pub(crate) fn test_series(bars: &[(f64, f64, f64, f64)]) -> Series {
    test_series_with_step(bars, Duration::hours(1))
}

#[cfg(test)]
pub(crate) fn test_series_with_step(bars: &[(f64, f64, f64, f64)], step: Duration) -> Series {
    let start = DateTime::<Utc>::UNIX_EPOCH;
    Series::from_candles(
        bars.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                timestamp: start + step * i as i32,
                open,
                high,
                low,
                close,
                volume: None,
            })
            .collect(),
    )
}

/// Series whose bars open at the previous close and wick 0.05 either side.
#[cfg(test)]
pub(crate) fn series_from_closes(closes: &[f64]) -> Series {
    let bars: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 0.05, open.min(close) - 0.05, close)
        })
        .collect();
    test_series(&bars)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

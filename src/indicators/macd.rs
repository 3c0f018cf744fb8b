// =============================================================================
// MACD — Moving Average Convergence / Divergence
// =============================================================================
//
//   line      = EMA12(close) - EMA26(close)
//   signal    = EMA9(line)
//   histogram = line - signal
//
// All three EMAs are first-value seeded, so every output is aligned with the
// input and defined from the first bar.

use super::ema::ema;

const FAST_PERIOD: usize = 12;
const SLOW_PERIOD: usize = 26;
const SIGNAL_PERIOD: usize = 9;

/// Paired MACD series.
#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    /// Latest (line, signal, histogram), `None` for empty input.
    pub fn latest(&self) -> Option<(f64, f64, f64)> {
        Some((
            *self.line.last()?,
            *self.signal.last()?,
            *self.histogram.last()?,
        ))
    }
}

/// Compute MACD(12, 26, 9) for `closes`.
pub fn macd(closes: &[f64]) -> Macd {
    let fast = ema(closes, FAST_PERIOD);
    let slow = ema(closes, SLOW_PERIOD);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, SIGNAL_PERIOD);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty() {
        let m = macd(&[]);
        assert!(m.line.is_empty());
        assert!(m.latest().is_none());
    }

    #[test]
    fn macd_flat_is_zero() {
        let m = macd(&vec![150.0; 60]);
        let (line, signal, hist) = m.latest().unwrap();
        assert!(line.abs() < 1e-12);
        assert!(signal.abs() < 1e-12);
        assert!(hist.abs() < 1e-12);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.5).collect();
        let m = macd(&closes);
        assert_eq!(m.line.len(), closes.len());
        let (line, signal, _) = m.latest().unwrap();
        assert!(line > 0.0);
        assert!(line > signal * 0.99);
    }
}

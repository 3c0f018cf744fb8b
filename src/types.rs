// =============================================================================
// Shared types used across the confluence engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional call produced by every analysis layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Default for Signal {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Side of an actual order suggestion.  Unlike [`Signal`] there is no
/// neutral variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::Buy => Some(Self::Buy),
            Signal::Sell => Some(Self::Sell),
            Signal::Hold => None,
        }
    }

    /// +1.0 for buys, -1.0 for sells.
    pub fn direction(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Moving-average trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    StrongUp,
    Up,
    Range,
    Down,
    StrongDown,
}

impl Trend {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::StrongUp | Self::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Self::StrongDown | Self::Down)
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongUp => write!(f, "Strong Up"),
            Self::Up => write!(f, "Up"),
            Self::Range => write!(f, "Range"),
            Self::Down => write!(f, "Down"),
            Self::StrongDown => write!(f, "Strong Down"),
        }
    }
}

/// Price momentum bucket over a timeframe-specific lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Momentum {
    Strong,
    SlightlyStrong,
    Neutral,
    SlightlyWeak,
    Weak,
    /// Not enough bars to measure.
    Unknown,
}

impl Momentum {
    /// True for every bucket that shows a directional push, either way.
    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            Self::Strong | Self::SlightlyStrong | Self::SlightlyWeak | Self::Weak
        )
    }
}

impl std::fmt::Display for Momentum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "Strong"),
            Self::SlightlyStrong => write!(f, "Slightly Strong"),
            Self::Neutral => write!(f, "Neutral"),
            Self::SlightlyWeak => write!(f, "Slightly Weak"),
            Self::Weak => write!(f, "Weak"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryWeak => write!(f, "Very Weak"),
            Self::Weak => write!(f, "Weak"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Strong => write!(f, "Strong"),
            Self::VeryStrong => write!(f, "Very Strong"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// No volatility information was available.
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How strongly the individual timeframes agree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalAlignment {
    StrongBuyConsensus,
    StrongSellConsensus,
    BuyLean,
    SellLean,
    NoConsensus,
}

impl std::fmt::Display for SignalAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuyConsensus => write!(f, "Strong Buy Consensus"),
            Self::StrongSellConsensus => write!(f, "Strong Sell Consensus"),
            Self::BuyLean => write!(f, "Buy Lean"),
            Self::SellLean => write!(f, "Sell Lean"),
            Self::NoConsensus => write!(f, "No Consensus"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Trading style associated with each analysis timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingStyle {
    Scalping,
    DayTrading,
    PositionTrading,
    SwingTrading,
}

impl std::fmt::Display for TradingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalping => write!(f, "Scalping"),
            Self::DayTrading => write!(f, "Day Trading"),
            Self::PositionTrading => write!(f, "Position Trading"),
            Self::SwingTrading => write!(f, "Swing Trading"),
        }
    }
}

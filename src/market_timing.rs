// =============================================================================
// Market Timing
// =============================================================================
//
// Where the local clock sits in the FX trading day and week.
//
// Sessions by local hour:
//   00-07  Sydney / Wellington   low activity
//   07-15  Tokyo                 medium
//   15-21  London                high
//   21-24  New York              high
//
// Active market windows are half-open `[start, end)` and may wrap midnight:
//   Tokyo 09-15, London 16-01, New York 22-05.
//
// Pure function of the supplied timestamp.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::TradingStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    SydneyWellington,
    Tokyo,
    London,
    NewYork,
}

impl Session {
    pub fn at_hour(hour: u32) -> Self {
        match hour {
            0..=6 => Self::SydneyWellington,
            7..=14 => Self::Tokyo,
            15..=20 => Self::London,
            _ => Self::NewYork,
        }
    }

    pub fn activity(self) -> ActivityLevel {
        match self {
            Self::SydneyWellington => ActivityLevel::Low,
            Self::Tokyo => ActivityLevel::Medium,
            Self::London | Self::NewYork => ActivityLevel::High,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SydneyWellington => write!(f, "Sydney/Wellington"),
            Self::Tokyo => write!(f, "Tokyo"),
            Self::London => write!(f, "London"),
            Self::NewYork => write!(f, "New York"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekTiming {
    /// Mon/Tue: direction not yet established.
    EarlyWeek,
    /// Wed/Thu: trends tend to continue.
    MidWeek,
    /// Fri-Sun: position squaring.
    LateWeek,
}

impl WeekTiming {
    pub fn for_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon | Weekday::Tue => Self::EarlyWeek,
            Weekday::Wed | Weekday::Thu => Self::MidWeek,
            _ => Self::LateWeek,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingRecommendation {
    Active,
    Cautious,
    WaitAndSee,
}

impl fmt::Display for TimingRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "trade actively"),
            Self::Cautious => write!(f, "trade cautiously"),
            Self::WaitAndSee => write!(f, "wait and see"),
        }
    }
}

pub fn recommend(session: Session, day: Weekday) -> TimingRecommendation {
    let tue_to_thu = matches!(day, Weekday::Tue | Weekday::Wed | Weekday::Thu);
    match session {
        Session::London | Session::NewYork if tue_to_thu => TimingRecommendation::Active,
        Session::Tokyo if matches!(day, Weekday::Tue | Weekday::Wed) => {
            TimingRecommendation::Cautious
        }
        _ => TimingRecommendation::WaitAndSee,
    }
}

// ---------------------------------------------------------------------------
// Active market windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketWindow {
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl MarketWindow {
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

pub const MARKET_WINDOWS: [MarketWindow; 3] = [
    MarketWindow { name: "Tokyo", start_hour: 9, end_hour: 15 },
    MarketWindow { name: "London", start_hour: 16, end_hour: 1 },
    MarketWindow { name: "New York", start_hour: 22, end_hour: 5 },
];

pub fn active_windows(hour: u32) -> Vec<&'static str> {
    MARKET_WINDOWS
        .iter()
        .filter(|w| w.contains(hour))
        .map(|w| w.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTiming {
    pub local_time: DateTime<FixedOffset>,
    pub session: Session,
    pub activity: ActivityLevel,
    pub week_timing: WeekTiming,
    pub recommendation: TimingRecommendation,
    pub active_markets: Vec<String>,
    pub optimal_for: TradingStyle,
}

pub fn assess_market_timing(now: DateTime<FixedOffset>) -> MarketTiming {
    let hour = now.hour();
    let day = now.weekday();
    let session = Session::at_hour(hour);
    let active_markets: Vec<String> = active_windows(hour).into_iter().map(String::from).collect();
    let optimal_for = if active_markets.len() >= 2 {
        TradingStyle::DayTrading
    } else {
        TradingStyle::Scalping
    };

    MarketTiming {
        local_time: now,
        session,
        activity: session.activity(),
        week_timing: WeekTiming::for_weekday(day),
        recommendation: recommend(session, day),
        active_markets,
        optimal_for,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    #[test]
    fn session_boundaries() {
        assert_eq!(Session::at_hour(0), Session::SydneyWellington);
        assert_eq!(Session::at_hour(6), Session::SydneyWellington);
        assert_eq!(Session::at_hour(7), Session::Tokyo);
        assert_eq!(Session::at_hour(14), Session::Tokyo);
        assert_eq!(Session::at_hour(15), Session::London);
        assert_eq!(Session::at_hour(20), Session::London);
        assert_eq!(Session::at_hour(21), Session::NewYork);
        assert_eq!(Session::at_hour(23), Session::NewYork);
    }

    #[test]
    fn windows_wrap_midnight() {
        assert_eq!(active_windows(10), vec!["Tokyo"]);
        assert_eq!(active_windows(15), Vec::<&str>::new());
        assert_eq!(active_windows(23), vec!["London", "New York"]);
        assert_eq!(active_windows(0), vec!["London", "New York"]);
        assert_eq!(active_windows(1), vec!["New York"]);
        assert_eq!(active_windows(5), Vec::<&str>::new());
        assert_eq!(active_windows(17), vec!["London"]);
    }

    #[test]
    fn london_midweek_is_active_day_trading() {
        // 2024-01-17 is a Wednesday.
        let t = assess_market_timing(jst(2024, 1, 17, 23));
        assert_eq!(t.session, Session::NewYork);
        assert_eq!(t.activity, ActivityLevel::High);
        assert_eq!(t.week_timing, WeekTiming::MidWeek);
        assert_eq!(t.recommendation, TimingRecommendation::Active);
        assert_eq!(t.optimal_for, TradingStyle::DayTrading);
    }

    #[test]
    fn tokyo_recommendations() {
        // Tuesday and Wednesday are cautious, Thursday is not.
        assert_eq!(recommend(Session::Tokyo, Weekday::Tue), TimingRecommendation::Cautious);
        assert_eq!(recommend(Session::Tokyo, Weekday::Wed), TimingRecommendation::Cautious);
        assert_eq!(recommend(Session::Tokyo, Weekday::Thu), TimingRecommendation::WaitAndSee);
    }

    #[test]
    fn monday_london_waits() {
        // 2024-01-15 is a Monday.
        let t = assess_market_timing(jst(2024, 1, 15, 17));
        assert_eq!(t.session, Session::London);
        assert_eq!(t.week_timing, WeekTiming::EarlyWeek);
        assert_eq!(t.recommendation, TimingRecommendation::WaitAndSee);
        assert_eq!(t.optimal_for, TradingStyle::Scalping);
    }

    #[test]
    fn weekend_is_late_week() {
        assert_eq!(WeekTiming::for_weekday(Weekday::Fri), WeekTiming::LateWeek);
        assert_eq!(WeekTiming::for_weekday(Weekday::Sun), WeekTiming::LateWeek);
    }
}

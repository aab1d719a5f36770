use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};

/// How the upper `created_at` bound of a month is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthEnd {
    /// The real last day of the month.
    #[default]
    Calendar,
    /// Always day 31, as older exports did. Short months then rely on the
    /// store tolerating an impossible date.
    LegacyDay31,
}

impl FromStr for MonthEnd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar" => Ok(MonthEnd::Calendar),
            "day31" | "legacy" => Ok(MonthEnd::LegacyDay31),
            other => Err(format!("unknown month end mode '{}'", other)),
        }
    }
}

/// A calendar month; also names the worksheet tab (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncMonth {
    year: i32,
    month: u32,
}

impl SyncMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month of the local clock.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Worksheet tab title.
    pub fn tab_name(&self) -> String {
        self.to_string()
    }

    pub fn last_day(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(28)
    }

    /// `created_at` bounds used to query the month's orders.
    pub fn window(&self, end: MonthEnd) -> OrderWindow {
        let last_day = match end {
            MonthEnd::Calendar => self.last_day(),
            MonthEnd::LegacyDay31 => 31,
        };
        OrderWindow {
            from: format!("{}-01 00:00:00", self),
            to: format!("{}-{:02} 23:59:59", self, last_day),
        }
    }
}

impl fmt::Display for SyncMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for SyncMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        SyncMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

/// Inclusive `created_at` range, formatted the way the store filters expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWindow {
    pub from: String,
    pub to: String,
}

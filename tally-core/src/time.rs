//! Calendar-month arithmetic and timezone-aware "today".

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, ordered chronologically. Serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(idx: i64) -> Self {
        Self {
            year: idx.div_euclid(12) as i32,
            month: idx.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn succ(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn pred(&self) -> Self {
        Self::from_index(self.index() - 1)
    }

    pub fn minus_months(&self, n: u32) -> Self {
        Self::from_index(self.index() - n as i64)
    }

    /// Human label like "Jan 2024"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_ABBREV[(self.month - 1) as usize], self.year)
    }

    /// Every month from `self` through `end`, inclusive. Empty if `end < self`.
    pub fn range_inclusive(&self, end: YearMonth) -> Vec<YearMonth> {
        (self.index()..=end.index()).map(Self::from_index).collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{s}', expected YYYY-MM"))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid year in '{s}'"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month in '{s}'"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

/// First month of a trailing window of `months` months ending at `as_of`'s month.
///
/// `months` of 0 is treated as 1.
pub fn window_start(as_of: NaiveDate, months: u32) -> YearMonth {
    YearMonth::of(as_of).minus_months(months.max(1) - 1)
}

/// True if `date` falls in the trailing window: on or after the first day of
/// `window_start`, and not after `as_of`.
pub fn in_window(date: NaiveDate, as_of: NaiveDate, months: u32) -> bool {
    date <= as_of && YearMonth::of(date) >= window_start(as_of, months)
}

/// Today's date in an IANA timezone like "America/Chicago".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

//! Calendar-period bucketing.
//!
//! Pure, stateless mappings between timestamps and calendar buckets for the
//! four supported granularities: year, month, day, hour. Every grouped
//! view in the crate goes through [`Period::key_of`] on the way in and
//! [`PeriodKey::start`] on the way out, so bucket boundary semantics live
//! in exactly one place.
//!
//! # Examples
//!
//! ```
//! use chatstats::period::{Period, PeriodKey};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 11, 2, 9, 30, 0).unwrap();
//! assert_eq!(Period::Month.key_of(ts), PeriodKey::Month(2014, 11));
//! assert_eq!(
//!     Period::Month.key_of(ts).start(),
//!     Utc.with_ymd_and_hms(2014, 11, 1, 0, 0, 0).unwrap(),
//! );
//! assert_eq!(Period::Month.label_of(ts), "November");
//! ```
//!
//! Stepping is calendar-aware: adding one month to Jan 31 clamps to the
//! last valid day of February rather than overflowing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, Months, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatStatsError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A calendar granularity used for bucketing and ranged filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Calendar year.
    Year,
    /// Calendar month.
    Month,
    /// Calendar day.
    Day,
    /// Clock hour.
    Hour,
}

/// The bucket a timestamp falls into for a given [`Period`].
///
/// Keys order chronologically within one granularity; mixing granularities
/// in one collection is a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodKey {
    /// Bucket for [`Period::Year`]: the calendar year.
    Year(i32),
    /// Bucket for [`Period::Month`]: (year, month).
    Month(i32, u32),
    /// Bucket for [`Period::Day`]: (year, month, day).
    Day(i32, u32, u32),
    /// Bucket for [`Period::Hour`]: (year, month, day, hour).
    Hour(i32, u32, u32, u32),
}

impl Period {
    /// Maps a timestamp to its bucket key.
    pub fn key_of(self, ts: DateTime<Utc>) -> PeriodKey {
        match self {
            Period::Year => PeriodKey::Year(ts.year()),
            Period::Month => PeriodKey::Month(ts.year(), ts.month()),
            Period::Day => PeriodKey::Day(ts.year(), ts.month(), ts.day()),
            Period::Hour => PeriodKey::Hour(ts.year(), ts.month(), ts.day(), ts.hour()),
        }
    }

    /// Maps a timestamp to its human label.
    ///
    /// Year → the year number, month → the month name, day → the weekday
    /// name, hour → the hour of day (0–23). Labels deliberately collapse
    /// across years so that "which month of the year" style aggregations
    /// can sum over the whole archive.
    pub fn label_of(self, ts: DateTime<Utc>) -> String {
        match self {
            Period::Year => ts.year().to_string(),
            Period::Month => MONTH_NAMES[ts.month0() as usize].to_string(),
            Period::Day => {
                WEEKDAY_NAMES[ts.weekday().num_days_from_monday() as usize].to_string()
            }
            Period::Hour => ts.hour().to_string(),
        }
    }

    /// Returns the full label domain for this period, in natural order.
    ///
    /// Months and weekdays have fixed inventories; hours run 0–23. Years
    /// have no finite domain, so [`Period::Year`] returns an empty vec and
    /// callers derive the domain from observed data.
    pub fn labels(self) -> Vec<String> {
        match self {
            Period::Year => Vec::new(),
            Period::Month => MONTH_NAMES.iter().map(|m| (*m).to_string()).collect(),
            Period::Day => WEEKDAY_NAMES.iter().map(|d| (*d).to_string()).collect(),
            Period::Hour => (0..24).map(|h| h.to_string()).collect(),
        }
    }

    /// Steps a timestamp forward by one period, calendar-aware.
    ///
    /// Month and year steps clamp to the last valid day of the target
    /// month (Jan 31 + 1 month → Feb 28/29), matching chrono's
    /// `checked_add_months` semantics.
    pub fn advance(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            // Calendar arithmetic only fails at the far end of chrono's
            // representable range; saturating there is fine for export data.
            Period::Year => ts.checked_add_months(Months::new(12)).unwrap_or(ts),
            Period::Month => ts.checked_add_months(Months::new(1)).unwrap_or(ts),
            Period::Day => ts.checked_add_days(Days::new(1)).unwrap_or(ts),
            Period::Hour => ts
                .checked_add_signed(Duration::hours(1))
                .unwrap_or(ts),
        }
    }

    /// Steps a timestamp backward by one period, calendar-aware.
    pub fn retreat(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Year => ts.checked_sub_months(Months::new(12)).unwrap_or(ts),
            Period::Month => ts.checked_sub_months(Months::new(1)).unwrap_or(ts),
            Period::Day => ts.checked_sub_days(Days::new(1)).unwrap_or(ts),
            Period::Hour => ts
                .checked_sub_signed(Duration::hours(1))
                .unwrap_or(ts),
        }
    }
}

impl PeriodKey {
    /// Returns the timestamp at the start of this bucket (day 1 / hour 0
    /// as applicable).
    pub fn start(self) -> DateTime<Utc> {
        // Keys are only produced by `Period::key_of` on valid timestamps,
        // so re-assembly cannot fail.
        let (y, m, d, h) = match self {
            PeriodKey::Year(y) => (y, 1, 1, 0),
            PeriodKey::Month(y, m) => (y, m, 1, 0),
            PeriodKey::Day(y, m, d) => (y, m, d, 0),
            PeriodKey::Hour(y, m, d, h) => (y, m, d, h),
        };
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Period::Year => "y",
            Period::Month => "m",
            Period::Day => "d",
            Period::Hour => "h",
        };
        f.write_str(token)
    }
}

impl FromStr for Period {
    type Err = ChatStatsError;

    /// Parses a period token. An unrecognized token is a configuration
    /// error, never silently defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "year" => Ok(Period::Year),
            "m" | "month" => Ok(Period::Month),
            "d" | "day" => Ok(Period::Day),
            "h" | "hour" => Ok(Period::Hour),
            _ => Err(ChatStatsError::unknown_period(s)),
        }
    }
}

//! Month arithmetic for the calendar grid.
//!
//! Month boundaries are computed in the user's time zone and sent to the
//! backend as UTC instants.

use std::fmt;

use chrono::{
    DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month `instant` falls in, as seen from `tz`.
    pub fn containing(instant: DateTime<Utc>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz).date_naive();
        Self(local.with_day(1).unwrap_or(local))
    }

    pub fn current(tz: Tz) -> Self {
        Self::containing(Utc::now(), tz)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        self.0.checked_add_months(Months::new(1)).map(Self).unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.0.checked_sub_months(Months::new(1)).map(Self).unwrap_or(*self)
    }

    /// Fetch window: first day 00:00:00 through last day 23:59:59, local to `tz`.
    pub fn range(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.0.and_time(NaiveTime::MIN);
        let end = self.next().0.and_time(NaiveTime::MIN) - TimeDelta::seconds(1);
        (local_to_utc(tz, start), local_to_utc(tz, end))
    }

    /// Toolbar heading, e.g. "February 2024".
    pub fn label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Month shown by a grid spanning `start..end`. Month grids pad with days of
/// the neighbouring months, so the midpoint is used rather than `start`.
pub fn visible_month(start: DateTime<Utc>, end: DateTime<Utc>, tz: Tz) -> Month {
    let mid = start + (end - start) / 2;
    Month::containing(mid, tz)
}

/// Resolve a local wall-clock time. Times that fall in a DST gap are moved
/// past it.
fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

//! Monthly engagement send-window policy.
//!
//! Engagement notifications go out at most once per calendar month, on the
//! first day of the month, inside a daytime window. The user picks a preferred
//! time; anything the window cannot honor falls back to the default send time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// First hour of the allowed daytime window.
pub const WINDOW_START_HOUR: u32 = 9;
/// Last hour of the allowed daytime window (the window closes at HH:00).
pub const WINDOW_END_HOUR: u32 = 18;
/// Hour used when the preferred hour is outside the window.
pub const DEFAULT_SEND_HOUR: u32 = 10;
/// Minute used together with [`DEFAULT_SEND_HOUR`].
pub const DEFAULT_SEND_MINUTE: u32 = 0;

/// A normalized local time of day for the monthly send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SendTime {
    hour: u32,
    minute: u32,
}

impl SendTime {
    /// Normalize a preferred hour/minute.
    ///
    /// Out-of-window hours silently become [`DEFAULT_SEND_HOUR`]; minutes are
    /// clamped to `0..=59`. The window closes at 18:00, so an hour of 18 only
    /// keeps minute 0.
    pub fn normalized(preferred_hour: i32, preferred_minute: i32) -> Self {
        let in_window = (WINDOW_START_HOUR as i32..=WINDOW_END_HOUR as i32).contains(&preferred_hour);
        if !in_window {
            return Self::default();
        }

        let hour = preferred_hour as u32;
        let minute = if hour == WINDOW_END_HOUR {
            0
        } else {
            preferred_minute.clamp(0, 59) as u32
        };
        Self { hour, minute }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl Default for SendTime {
    fn default() -> Self {
        Self {
            hour: DEFAULT_SEND_HOUR,
            minute: DEFAULT_SEND_MINUTE,
        }
    }
}

impl fmt::Display for SendTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Calendar month marker used to reserve the monthly slot (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given local date/time.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month key: {s}"))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid year in month key: {s}"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("invalid month in month key: {s}"))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month out of range: {s}"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Resolve a local wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times that do
/// not exist (DST spring-forward) move forward an hour.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt;
    }
    let shifted = naive + Duration::hours(1);
    tz.from_local_datetime(&shifted)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// The monthly slot for `month` at `time` in `tz`.
pub fn slot_for_month<Tz: TimeZone>(tz: &Tz, month: MonthKey, time: SendTime) -> DateTime<Tz> {
    resolve_local(tz, month.first_day().and_time(time.as_naive_time()))
}

/// Next monthly send instant strictly after `now`.
///
/// Day 1 of the current month at `time`; if that has already passed (or is
/// exactly now), day 1 of the following month.
pub fn next_monthly_slot<Tz: TimeZone>(now: &DateTime<Tz>, time: SendTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let current = MonthKey::of(&now.naive_local());
    let candidate = slot_for_month(&tz, current, time);
    if candidate > *now {
        candidate
    } else {
        slot_for_month(&tz, current.next(), time)
    }
}

/// Whether a local time of day falls in the daytime window `[09:00:00, 18:00:00]`.
pub fn is_within_window<T: Timelike>(local: &T) -> bool {
    let seconds = local.num_seconds_from_midnight();
    let at_end = seconds == WINDOW_END_HOUR * 3600 && local.nanosecond() == 0;
    seconds >= WINDOW_START_HOUR * 3600 && (seconds < WINDOW_END_HOUR * 3600 || at_end)
}

/// Quiet hours during which nothing should be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHoursPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_quiet_start")]
    pub start_hour: u8,
    #[serde(default = "default_quiet_end")]
    pub end_hour: u8,
}

fn default_true() -> bool {
    true
}
fn default_quiet_start() -> u8 {
    22
}
fn default_quiet_end() -> u8 {
    8
}

impl Default for QuietHoursPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: default_quiet_start(),
            end_hour: default_quiet_end(),
        }
    }
}

impl QuietHoursPolicy {
    /// Check if a local time of day is within quiet hours.
    pub fn contains<T: Timelike>(&self, local: &T) -> bool {
        if !self.enabled {
            return false;
        }

        let hour = local.hour();
        let start = u32::from(self.start_hour);
        let end = u32::from(self.end_hour);

        // Overnight window (e.g., 22:00 - 08:00)
        if start > end {
            return hour >= start || hour < end;
        }

        hour >= start && hour < end
    }
}

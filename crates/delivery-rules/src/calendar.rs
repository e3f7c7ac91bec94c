//! Calendar-date primitives: parsing, weekday indexing, and inclusive ranges.
//!
//! Everything here works at day granularity. Time-of-day and time zones never
//! enter the comparison; a timestamp-shaped input is truncated to its date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Parse a strict `YYYY-MM-DD` date.
///
/// Only the exact ten-character form is accepted: no surrounding whitespace,
/// no sign, no unpadded fields. Invalid calendar dates such as `2024-02-30`
/// are rejected too.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    parse_iso(s).ok_or_else(|| RulesError::InvalidDate(s.to_string()))
}

/// Parse a candidate selection into a calendar date.
///
/// Accepts a bare date, or a timestamp whose first ten characters are the date
/// followed by `T` or a space (e.g. `2024-06-08T15:30:00Z`). The time part is
/// discarded without being parsed. Surrounding whitespace is ignored.
pub fn parse_candidate(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    let date_part = match trimmed.as_bytes().get(10) {
        Some(b'T' | b' ') => &trimmed[..10],
        _ => trimmed,
    };
    parse_iso(date_part).ok_or_else(|| RulesError::InvalidDate(trimmed.to_string()))
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    let shaped = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Format a date in the wire format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Day-of-week index, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// English weekday name for an index, or `None` outside `0..=6`.
pub fn weekday_name(day: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(day as usize).copied()
}

/// Returns `true` if `day` is a valid weekday index.
pub fn is_valid_weekday(day: u8) -> bool {
    day <= 6
}

/// An inclusive `[start, end]` interval of calendar dates.
///
/// Construction goes through [`DateRange::new`], so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawRange {
    start: String,
    end: String,
}

impl TryFrom<RawRange> for DateRange {
    type Error = RulesError;

    fn try_from(raw: RawRange) -> Result<Self> {
        DateRange::new(parse_date(&raw.start)?, parse_date(&raw.end)?)
    }
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RulesError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive at both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both bounds.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", format_date(self.start), format_date(self.end))
    }
}

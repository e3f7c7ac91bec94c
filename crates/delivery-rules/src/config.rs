//! The blocking rule set and its persisted JSON shape.
//!
//! A [`Configuration`] holds three independent rule collections: blocked
//! weekdays, blocked specific dates, and blocked inclusive ranges. Overlap
//! between collections (a blocked date that also falls inside a blocked range,
//! two ranges covering the same days) is allowed and never merged.
//!
//! The persisted form is a single JSON object:
//!
//! ```json
//! {
//!   "blockedSpecificDates": ["2024-12-25"],
//!   "blockedDays": [0, 6],
//!   "blockedRanges": [{"start": "2024-07-01", "end": "2024-07-14"}]
//! }
//! ```
//!
//! Decoding is lenient: anything that does not fit is dropped and logged, so a
//! damaged blob degrades to fewer rules instead of a failed load.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::calendar::{self, DateRange};
use crate::error::{Result, RulesError};

const FIELD_DATES: &str = "blockedSpecificDates";
const FIELD_DAYS: &str = "blockedDays";
const FIELD_RANGES: &str = "blockedRanges";

/// The current blocking rules for one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    blocked_weekdays: BTreeSet<u8>,
    /// Insertion-ordered, duplicate-free.
    blocked_dates: Vec<NaiveDate>,
    blocked_ranges: Vec<DateRange>,
}

/// Serialized record, field order and names fixed by the storage contract.
#[derive(Serialize)]
struct ConfigurationRecord<'a> {
    #[serde(rename = "blockedSpecificDates")]
    blocked_specific_dates: &'a [NaiveDate],
    #[serde(rename = "blockedDays")]
    blocked_days: Vec<u8>,
    #[serde(rename = "blockedRanges")]
    blocked_ranges: &'a [DateRange],
}

impl Configuration {
    /// An empty configuration: every date from today onwards is available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from already-typed parts.
    ///
    /// Weekdays outside `0..=6` are rejected. Repeated dates collapse to their
    /// first occurrence; ranges are kept as given.
    pub fn from_parts(
        weekdays: impl IntoIterator<Item = u8>,
        dates: impl IntoIterator<Item = NaiveDate>,
        ranges: impl IntoIterator<Item = DateRange>,
    ) -> Result<Self> {
        let mut blocked_weekdays = BTreeSet::new();
        for day in weekdays {
            if !calendar::is_valid_weekday(day) {
                return Err(RulesError::InvalidWeekday(day));
            }
            blocked_weekdays.insert(day);
        }
        Ok(Self::from_checked(blocked_weekdays, dates, ranges))
    }

    /// Assemble from weekdays already known to be in `0..=6`.
    pub(crate) fn from_checked(
        blocked_weekdays: BTreeSet<u8>,
        dates: impl IntoIterator<Item = NaiveDate>,
        ranges: impl IntoIterator<Item = DateRange>,
    ) -> Self {
        let mut blocked_dates = Vec::new();
        for date in dates {
            if !blocked_dates.contains(&date) {
                blocked_dates.push(date);
            }
        }

        Self {
            blocked_weekdays,
            blocked_dates,
            blocked_ranges: ranges.into_iter().collect(),
        }
    }

    /// Decode a persisted blob, degrading to empty on anything unusable.
    ///
    /// - unparsable JSON or a non-object payload yields the empty configuration
    /// - a field with the wrong type is treated as absent
    /// - individual malformed entries are skipped, the rest are kept
    pub fn from_json(json: &str) -> Self {
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparsable configuration payload, using empty configuration");
                return Self::default();
            }
        };

        match value {
            Value::Object(map) => Self::from_json_object(&map),
            other => {
                warn!(
                    kind = json_kind(&other),
                    "configuration payload is not an object, using empty configuration"
                );
                Self::default()
            }
        }
    }

    fn from_json_object(map: &Map<String, Value>) -> Self {
        let mut config = Self::default();

        for value in array_field(map, FIELD_DAYS) {
            match value.as_u64() {
                Some(day) if day <= 6 => {
                    config.blocked_weekdays.insert(day as u8);
                }
                _ => warn!(entry = %value, "skipping malformed blocked weekday"),
            }
        }

        for value in array_field(map, FIELD_DATES) {
            match value.as_str().map(calendar::parse_date) {
                Some(Ok(date)) => {
                    if !config.blocked_dates.contains(&date) {
                        config.blocked_dates.push(date);
                    }
                }
                _ => warn!(entry = %value, "skipping malformed blocked date"),
            }
        }

        for value in array_field(map, FIELD_RANGES) {
            match parse_range(value) {
                Some(range) => config.blocked_ranges.push(range),
                None => warn!(entry = %value, "skipping malformed blocked range"),
            }
        }

        config
    }

    /// Encode into the persisted shape. Weekdays are written in ascending order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.record())?)
    }

    /// Same as [`to_json`](Self::to_json), indented for humans.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.record())?)
    }

    fn record(&self) -> ConfigurationRecord<'_> {
        ConfigurationRecord {
            blocked_specific_dates: &self.blocked_dates,
            blocked_days: self.blocked_weekdays.iter().copied().collect(),
            blocked_ranges: &self.blocked_ranges,
        }
    }

    pub fn blocked_weekdays(&self) -> &BTreeSet<u8> {
        &self.blocked_weekdays
    }

    pub fn blocked_dates(&self) -> &[NaiveDate] {
        &self.blocked_dates
    }

    pub fn blocked_ranges(&self) -> &[DateRange] {
        &self.blocked_ranges
    }

    pub fn is_weekday_blocked(&self, day: u8) -> bool {
        self.blocked_weekdays.contains(&day)
    }

    /// `true` when no rule of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.blocked_weekdays.is_empty()
            && self.blocked_dates.is_empty()
            && self.blocked_ranges.is_empty()
    }
}

/// Elements of an array-typed field, or nothing if the field is absent or not an array.
fn array_field<'a>(map: &'a Map<String, Value>, name: &str) -> &'a [Value] {
    match map.get(name) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(
                field = name,
                kind = json_kind(other),
                "configuration field has wrong type, ignoring it"
            );
            &[]
        }
        None => &[],
    }
}

fn parse_range(value: &Value) -> Option<DateRange> {
    let start = calendar::parse_date(value.get("start")?.as_str()?).ok()?;
    let end = calendar::parse_date(value.get("end")?.as_str()?).ok()?;
    DateRange::new(start, end).ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

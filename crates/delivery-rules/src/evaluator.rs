//! Availability evaluation -- decides whether a single calendar date can be chosen.
//!
//! Checks run in a fixed order and the first match is reported:
//!
//! 1. past date (`candidate < today`; today itself is never past)
//! 2. blocked weekday
//! 3. blocked specific date
//! 4. blocked range (inclusive bounds)
//!
//! The order only affects which reason is reported. Any match blocks.
//! `today` is always passed in, so evaluation never reads the clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::config::Configuration;

/// Why a date (or a missing selection) is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    PastDate,
    BlockedWeekday,
    BlockedDate,
    BlockedRange,
    NoSelection,
}

impl BlockReason {
    /// Guidance suitable for showing next to the date input.
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::PastDate => "Delivery dates in the past cannot be selected.",
            BlockReason::BlockedWeekday => "Deliveries are not made on this day of the week.",
            BlockReason::BlockedDate => "Deliveries are not available on this date.",
            BlockReason::BlockedRange => {
                "This date falls within a period when deliveries are paused."
            }
            BlockReason::NoSelection => "No date selected",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of evaluating a candidate date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Available,
    Blocked(BlockReason),
}

impl Decision {
    pub fn is_available(&self) -> bool {
        matches!(self, Decision::Available)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_available()
    }

    /// The block reason, or `None` when available.
    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            Decision::Available => None,
            Decision::Blocked(reason) => Some(*reason),
        }
    }
}

/// Decide whether `candidate` is available under `config`, relative to `today`.
pub fn evaluate(config: &Configuration, candidate: NaiveDate, today: NaiveDate) -> Decision {
    if candidate < today {
        return Decision::Blocked(BlockReason::PastDate);
    }

    if config.is_weekday_blocked(calendar::weekday_index(candidate)) {
        return Decision::Blocked(BlockReason::BlockedWeekday);
    }

    if config.blocked_dates().contains(&candidate) {
        return Decision::Blocked(BlockReason::BlockedDate);
    }

    if config
        .blocked_ranges()
        .iter()
        .any(|range| range.contains(candidate))
    {
        return Decision::Blocked(BlockReason::BlockedRange);
    }

    Decision::Available
}

/// Find the first available date on or after `from`, never earlier than `today`.
///
/// Scans at most `horizon_days` consecutive days. Returns `None` if every day in
/// the horizon is blocked (for example when all seven weekdays are blocked).
pub fn next_available(
    config: &Configuration,
    from: NaiveDate,
    today: NaiveDate,
    horizon_days: u32,
) -> Option<NaiveDate> {
    let start = from.max(today);
    start
        .iter_days()
        .take(horizon_days as usize)
        .find(|&date| evaluate(config, date, today).is_available())
}

/// Every blocked date in the inclusive window `[start, end]`, paired with its reason.
///
/// Returns an empty list when `start > end`.
pub fn blocked_dates_between(
    config: &Configuration,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<(NaiveDate, BlockReason)> {
    if start > end {
        return Vec::new();
    }

    start
        .iter_days()
        .take_while(|&date| date <= end)
        .filter_map(|date| evaluate(config, date, today).reason().map(|r| (date, r)))
        .collect()
}


//! Error types for delivery-rules operations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::editor::EntryId;

/// Validation failures raised at the editor and candidate-parsing boundary.
///
/// Malformed *persisted* data never produces one of these; the lenient decoder
/// drops bad entries instead.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Invalid weekday: {0} (expected 0 = Sunday through 6 = Saturday)")]
    InvalidWeekday(u8),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;

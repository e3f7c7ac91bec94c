//! # delivery-rules
//!
//! Deterministic delivery-date availability rules for checkout flows.
//!
//! An operator blocks weekdays, specific dates, and inclusive date ranges. At
//! checkout the buyer picks a date, and the same pure function decides both the
//! inline feedback and whether the order may proceed. "Today" is always passed
//! in, never read from the clock, so every decision is reproducible.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use delivery_rules::{can_proceed, BlockReason, Configuration, Decision};
//!
//! let config = Configuration::from_json(r#"{"blockedDays":[0,6]}"#);
//! let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//! let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
//!
//! assert_eq!(
//!     can_proceed(&config, Some(saturday), today),
//!     Decision::Blocked(BlockReason::BlockedWeekday)
//! );
//! ```
//!
//! ## Modules
//!
//! - [`calendar`] — date parsing, weekday indexing, inclusive ranges
//! - [`config`] — the blocking rule set and its persisted JSON shape
//! - [`evaluator`] — single-date availability decisions
//! - [`gate`] — the allow/block check guarding date selection
//! - [`editor`] — staged edits with stable entry ids
//! - [`store`] — owner-keyed persistence boundary
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod store;

pub use calendar::{parse_candidate, parse_date, DateRange};
pub use config::Configuration;
pub use editor::{EditorSession, EntryId, EntryKind};
pub use error::RulesError;
pub use evaluator::{blocked_dates_between, evaluate, next_available, BlockReason, Decision};
pub use gate::{can_proceed, DeliverySelection, GateRejection, GateResponse, SelectionState};
pub use store::{
    load_configuration, persist_session, ConfigurationStore, FileStore, MemoryStore, PersistError,
    StoreError,
};

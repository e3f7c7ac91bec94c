//! Staged editing of a [`Configuration`].
//!
//! An [`EditorSession`] collects weekday toggles and additions, replacements and
//! removals of blocked dates and ranges, then produces a new configuration via
//! [`EditorSession::commit`]. Date and range entries are addressed by an
//! [`EntryId`] assigned when the entry enters the session, so removing one entry
//! never changes how the others are referenced. Display order is kept
//! separately for callers that still think in positions.
//!
//! A session is a single-writer value. Share a configuration between actors,
//! never a session.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::{self, DateRange};
use crate::config::Configuration;
use crate::error::{Result, RulesError};

/// Stable identifier of a date or range entry within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(EntryId)
    }
}

/// Which list an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Date,
    Range,
}

/// Entries keyed by id, plus their display order.
#[derive(Debug, Clone)]
struct EntryList<T> {
    entries: HashMap<EntryId, T>,
    order: Vec<EntryId>,
}

impl<T: Copy> EntryList<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn push(&mut self, id: EntryId, value: T) {
        self.entries.insert(id, value);
        self.order.push(id);
    }

    fn replace(&mut self, id: EntryId, value: T) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RulesError::UnknownEntry(id)),
        }
    }

    fn remove(&mut self, id: EntryId) -> bool {
        if self.entries.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        true
    }

    fn iter(&self) -> impl Iterator<Item = (EntryId, T)> + '_ {
        self.order.iter().map(|id| (*id, self.entries[id]))
    }

    fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    fn id_at(&self, index: usize) -> Option<EntryId> {
        self.order.get(index).copied()
    }
}

/// An in-progress edit of one owner's configuration.
#[derive(Debug, Clone)]
pub struct EditorSession {
    weekdays: BTreeSet<u8>,
    dates: EntryList<NaiveDate>,
    ranges: EntryList<DateRange>,
    next_id: u64,
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// A session over the empty configuration.
    pub fn new() -> Self {
        Self {
            weekdays: BTreeSet::new(),
            dates: EntryList::new(),
            ranges: EntryList::new(),
            next_id: 0,
            dirty: false,
        }
    }

    /// Start editing an existing configuration. Entries receive ids in display order.
    pub fn from_configuration(config: &Configuration) -> Self {
        let mut session = Self::new();
        session.weekdays = config.blocked_weekdays().clone();
        for &date in config.blocked_dates() {
            let id = session.allocate_id();
            session.dates.push(id, date);
        }
        for &range in config.blocked_ranges() {
            let id = session.allocate_id();
            session.ranges.push(id, range);
        }
        session
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Flip whether `day` is blocked. Returns the new blocked state.
    pub fn toggle_weekday(&mut self, day: u8) -> Result<bool> {
        if !calendar::is_valid_weekday(day) {
            return Err(RulesError::InvalidWeekday(day));
        }
        let blocked = if self.weekdays.remove(&day) {
            false
        } else {
            self.weekdays.insert(day);
            true
        };
        self.dirty = true;
        debug!(day, blocked, "toggled weekday");
        Ok(blocked)
    }

    /// Replace the date with id `editing`, or append `date` when `editing` is `None`.
    ///
    /// Appending a date that is already listed changes nothing and returns the id
    /// of the existing entry. Replacing keeps the entry's position.
    pub fn upsert_date(&mut self, date: NaiveDate, editing: Option<EntryId>) -> Result<EntryId> {
        if let Some(id) = editing {
            self.dates.replace(id, date)?;
            self.dirty = true;
            debug!(%id, %date, "replaced blocked date");
            return Ok(id);
        }

        if let Some((id, _)) = self.dates.iter().find(|(_, existing)| *existing == date) {
            debug!(%id, %date, "date already blocked");
            return Ok(id);
        }

        let id = self.allocate_id();
        self.dates.push(id, date);
        self.dirty = true;
        debug!(%id, %date, "added blocked date");
        Ok(id)
    }

    /// Replace the range with id `editing`, or append `range`.
    ///
    /// Ranges are independent rules: overlaps with other ranges or dates are
    /// accepted as-is.
    pub fn upsert_range(&mut self, range: DateRange, editing: Option<EntryId>) -> Result<EntryId> {
        if let Some(id) = editing {
            self.ranges.replace(id, range)?;
            self.dirty = true;
            debug!(%id, %range, "replaced blocked range");
            return Ok(id);
        }

        let id = self.allocate_id();
        self.ranges.push(id, range);
        self.dirty = true;
        debug!(%id, %range, "added blocked range");
        Ok(id)
    }

    /// Validate `start <= end` and upsert the resulting range.
    pub fn upsert_range_bounds(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        editing: Option<EntryId>,
    ) -> Result<EntryId> {
        let range = DateRange::new(start, end)?;
        self.upsert_range(range, editing)
    }

    /// Remove an entry. Unknown ids are ignored and reported as `false`.
    pub fn remove(&mut self, kind: EntryKind, id: EntryId) -> bool {
        let removed = match kind {
            EntryKind::Date => self.dates.remove(id),
            EntryKind::Range => self.ranges.remove(id),
        };
        if removed {
            self.dirty = true;
            debug!(?kind, %id, "removed entry");
        }
        removed
    }

    pub fn blocked_weekdays(&self) -> &BTreeSet<u8> {
        &self.weekdays
    }

    /// Blocked dates in display order.
    pub fn dates(&self) -> Vec<(EntryId, NaiveDate)> {
        self.dates.iter().collect()
    }

    /// Blocked ranges in display order.
    pub fn ranges(&self) -> Vec<(EntryId, DateRange)> {
        self.ranges.iter().collect()
    }

    /// Id of the date shown at display position `index`.
    pub fn date_id_at(&self, index: usize) -> Option<EntryId> {
        self.dates.id_at(index)
    }

    /// Id of the range shown at display position `index`.
    pub fn range_id_at(&self, index: usize) -> Option<EntryId> {
        self.ranges.id_at(index)
    }

    /// Whether anything changed since the session was created.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Snapshot the staged state as a configuration.
    ///
    /// A replaced date may now equal another listed date; the configuration keeps
    /// only the first of such duplicates.
    pub fn commit(&self) -> Configuration {
        Configuration::from_checked(
            self.weekdays.clone(),
            self.dates.values(),
            self.ranges.values(),
        )
    }
}

//! Calendar index mapping dates to ordered content items
//!
//! The index is a plain in-memory structure with no interior locking;
//! callers serialize mutations through the owning workspace so that `move`
//! (a compound remove+place) never interleaves with a concurrent `place`
//! on the same bucket.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::error::{SchedulerError, SchedulerResult};

/// Maps calendar dates to ordered lists of content item ids
///
/// Invariants:
/// - each id appears in at most one bucket
/// - within-day order is stable for display but carries no meaning
/// - an emptied bucket is dropped, never left dangling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarIndex {
    buckets: BTreeMap<NaiveDate, Vec<Uuid>>,
}

impl CalendarIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item into the bucket for `date`
    ///
    /// Fails with a conflict if the item is already placed anywhere;
    /// the caller must remove it first.
    pub fn place(&mut self, item_id: Uuid, date: NaiveDate) -> SchedulerResult<()> {
        if let Some(existing) = self.date_of(item_id) {
            return Err(SchedulerError::conflict(item_id, existing, date));
        }
        self.buckets.entry(date).or_default().push(item_id);
        Ok(())
    }

    /// Remove an item from whatever bucket currently holds it
    ///
    /// Returns the date it was removed from. Removing an item that was
    /// never placed is valid and returns `None`.
    pub fn remove(&mut self, item_id: Uuid) -> Option<NaiveDate> {
        let date = self.date_of(item_id)?;
        let bucket = self.buckets.get_mut(&date)?;
        bucket.retain(|id| *id != item_id);
        if bucket.is_empty() {
            self.buckets.remove(&date);
        }
        Some(date)
    }

    /// Move an item between buckets atomically
    ///
    /// `from == to` is a no-op (the item must still be present). All
    /// validation happens before any mutation, so a failed call leaves the
    /// index untouched and a successful call never passes through a state
    /// where the item is in zero or two buckets.
    pub fn move_item(
        &mut self,
        item_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SchedulerResult<()> {
        if !self.items_on(from).contains(&item_id) {
            return Err(SchedulerError::not_found(item_id, from));
        }
        if from == to {
            return Ok(());
        }

        let bucket = self
            .buckets
            .get_mut(&from)
            .expect("bucket existence checked above");
        bucket.retain(|id| *id != item_id);
        if bucket.is_empty() {
            self.buckets.remove(&from);
        }
        self.buckets.entry(to).or_default().push(item_id);
        Ok(())
    }

    /// Get the ordered item ids for a date (empty if none)
    pub fn items_on(&self, date: NaiveDate) -> &[Uuid] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find the date currently holding an item
    pub fn date_of(&self, item_id: Uuid) -> Option<NaiveDate> {
        self.buckets
            .iter()
            .find(|(_, ids)| ids.contains(&item_id))
            .map(|(date, _)| *date)
    }

    /// Check whether an item is placed anywhere
    pub fn contains(&self, item_id: Uuid) -> bool {
        self.date_of(item_id).is_some()
    }

    /// Iterate over occupied dates and their buckets, in date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Uuid])> {
        self.buckets.iter().map(|(date, ids)| (*date, ids.as_slice()))
    }

    /// Total number of placed items
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Check whether the index holds no items
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

//! Drag-and-drop rescheduling between calendar dates
//!
//! The reschedule operation is a pure state transition over the calendar
//! index and the moved item; event wiring (drag-and-drop UI, HTTP handlers)
//! lives outside the core. Callers apply it while holding the workspace
//! write lock so the compound remove+place never interleaves with another
//! mutation.

use chrono::NaiveDate;

use crate::models::ContentItem;

use super::calendar::CalendarIndex;
use super::error::{SchedulerError, SchedulerResult};

/// Move an item from one date bucket to another
///
/// The item must currently reside in `from`'s bucket, or nothing is
/// mutated and `NotFound` is returned. `to` may be any date, including the
/// past: users backfill, and the calendar reflects the planning date, not
/// the publish date. Status never changes as a side effect; moving a
/// published item does not unpublish it.
pub fn reschedule(
    calendar: &mut CalendarIndex,
    item: &mut ContentItem,
    from: NaiveDate,
    to: NaiveDate,
) -> SchedulerResult<()> {
    if !calendar.items_on(from).contains(&item.id) {
        return Err(SchedulerError::not_found(item.id, from));
    }

    calendar.move_item(item.id, from, to)?;
    item.scheduled_date = to;

    tracing::debug!(item_id = %item.id, %from, %to, "rescheduled item");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentStatus, ContentType, Keyword, Trend};
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn item_on(d: u32) -> ContentItem {
        ContentItem::new(
            "Backlinks Explained",
            Keyword::new("backlinks", 900, 55, Trend::Up).unwrap(),
            ContentType::Explainer,
            date(d),
        )
    }

    #[test]
    fn test_reschedule_updates_date_and_bucket() {
        let mut calendar = CalendarIndex::new();
        let mut item = item_on(4);
        calendar.place(item.id, date(4)).unwrap();

        reschedule(&mut calendar, &mut item, date(4), date(10)).unwrap();

        assert_eq!(item.scheduled_date, date(10));
        assert_eq!(calendar.date_of(item.id), Some(date(10)));
        assert!(calendar.items_on(date(4)).is_empty());
    }

    #[test]
    fn test_reschedule_to_past_allowed() {
        let mut calendar = CalendarIndex::new();
        let mut item = item_on(10);
        calendar.place(item.id, date(10)).unwrap();

        reschedule(&mut calendar, &mut item, date(10), date(2)).unwrap();
        assert_eq!(item.scheduled_date, date(2));
    }

    #[test]
    fn test_reschedule_absent_item_mutates_nothing() {
        let mut calendar = CalendarIndex::new();
        let other = Uuid::new_v4();
        calendar.place(other, date(4)).unwrap();

        let mut item = item_on(4);
        let err = reschedule(&mut calendar, &mut item, date(4), date(10)).unwrap_err();

        assert_eq!(err, SchedulerError::not_found(item.id, date(4)));
        assert_eq!(item.scheduled_date, date(4));
        assert_eq!(calendar.items_on(date(4)), &[other]);
        assert!(calendar.items_on(date(10)).is_empty());
    }

    #[test]
    fn test_reschedule_preserves_status() {
        let mut calendar = CalendarIndex::new();
        let mut item = item_on(4);
        calendar.place(item.id, date(4)).unwrap();
        item.begin_generation().unwrap();

        reschedule(&mut calendar, &mut item, date(4), date(20)).unwrap();
        assert_eq!(item.status, ContentStatus::Generating);
    }

    #[test]
    fn test_reschedule_roundtrip() {
        let mut calendar = CalendarIndex::new();
        let mut item = item_on(4);
        let neighbor = Uuid::new_v4();
        calendar.place(neighbor, date(4)).unwrap();
        calendar.place(item.id, date(4)).unwrap();

        reschedule(&mut calendar, &mut item, date(4), date(10)).unwrap();
        reschedule(&mut calendar, &mut item, date(10), date(4)).unwrap();

        assert_eq!(calendar.items_on(date(4)), &[neighbor, item.id]);
        assert_eq!(item.scheduled_date, date(4));
    }
}

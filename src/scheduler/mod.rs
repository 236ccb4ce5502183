//! Content scheduling: calendar indexing, initial placement, rescheduling
//!
//! # Overview
//!
//! The scheduler owns the calendar side of the content pipeline. Accepted
//! keywords enter through the [`assignment::SchedulingAssigner`], which
//! spaces one content item per keyword across dates; the
//! [`calendar::CalendarIndex`] tracks which items sit on which date; and
//! [`reschedule::reschedule`] implements the drag-and-drop move between
//! buckets.
//!
//! # Architecture
//!
//! ```text
//!   keywords (priority order)
//!          │
//!          ▼
//!   ┌──────────────────┐    place     ┌─────────────────┐
//!   │ SchedulingAssigner│ ───────────▶ │  CalendarIndex  │
//!   └──────────────────┘              │ date → [items]  │
//!                                     └────────┬────────┘
//!                             reschedule       │  items_on
//!                          (drag-and-drop) ◀───┘
//! ```
//!
//! All mutations are single in-memory operations; the owning workspace
//! serializes them behind its lock so the compound remove+place inside a
//! move can never interleave with a concurrent place on the same bucket.
//!
//! # Invariants
//!
//! - an item id lives in at most one bucket at any time
//! - the bucket holding an item always matches its `scheduled_date`
//! - a failed operation leaves the index untouched (all-or-nothing)

pub mod assignment;
pub mod calendar;
pub mod error;
pub mod reschedule;

// Re-export main types
pub use assignment::{AssignerConfig, SchedulingAssigner, DEFAULT_SPACING_DAYS};
pub use calendar::CalendarIndex;
pub use error::{SchedulerError, SchedulerResult};
pub use reschedule::reschedule;

//! Error types for the scheduler module

use chrono::NaiveDate;
use std::fmt;
use uuid::Uuid;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
///
/// All of these are contract violations: a correct caller never triggers
/// them, so they are surfaced loudly rather than recorded on items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Item is already placed in a calendar bucket
    Conflict {
        item_id: Uuid,
        existing_date: NaiveDate,
        requested_date: NaiveDate,
    },

    /// Item is not in the bucket the caller named
    NotFound {
        item_id: Uuid,
        date: NaiveDate,
    },

    /// No content item exists with this id
    UnknownItem {
        item_id: Uuid,
    },

    /// Assigner was given an empty keyword list
    EmptyPlan,

    /// A computed placement falls outside the configured horizon
    HorizonExceeded {
        date: NaiveDate,
        horizon_days: u32,
    },

    /// Invalid assigner configuration
    InvalidConfig {
        field: String,
        reason: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                item_id,
                existing_date,
                requested_date,
            } => {
                write!(
                    f,
                    "item {} is already placed on {}; cannot place on {} without removing first",
                    item_id, existing_date, requested_date
                )
            }
            Self::NotFound { item_id, date } => {
                write!(f, "item {} is not in the bucket for {}", item_id, date)
            }
            Self::UnknownItem { item_id } => {
                write!(f, "no content item with id {}", item_id)
            }
            Self::EmptyPlan => {
                write!(f, "cannot build a schedule from an empty keyword list")
            }
            Self::HorizonExceeded { date, horizon_days } => {
                write!(
                    f,
                    "placement on {} exceeds the {}-day scheduling horizon",
                    date, horizon_days
                )
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid assigner config '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Create a conflict error
    pub fn conflict(item_id: Uuid, existing_date: NaiveDate, requested_date: NaiveDate) -> Self {
        Self::Conflict {
            item_id,
            existing_date,
            requested_date,
        }
    }

    /// Create a not-found error
    pub fn not_found(item_id: Uuid, date: NaiveDate) -> Self {
        Self::NotFound { item_id, date }
    }

    /// Create an unknown-item error
    pub fn unknown_item(item_id: Uuid) -> Self {
        Self::UnknownItem { item_id }
    }

    /// Create an invalid-config error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is recoverable
    ///
    /// Scheduler errors are programming-contract violations, never
    /// operational failures, so none of them warrant a retry.
    pub fn is_recoverable(&self) -> bool {
        false
    }
}

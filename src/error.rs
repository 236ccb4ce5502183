//! Unified error handling for the plume crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while maintaining the
//! ability to use domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`PlumeErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Scheduler and lifecycle errors are programming-contract violations: a
//! correct caller never triggers them, so they are non-recoverable and
//! surfaced loudly. Generation, connection and publish errors are expected
//! operational failures: they are recorded on the affected content item and
//! surfaced for a manual retry, never retried automatically (both generation
//! and publish side effects are potentially non-idempotent).

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::generation::GenerationError;
pub use crate::models::LifecycleError;
pub use crate::publish::PublishError;
pub use crate::scheduler::error::SchedulerError;
pub use crate::storage::StorageError;

/// Common trait for plume error types
pub trait PlumeErrorTrait: std::error::Error {
    /// Check if this error is recoverable (worth a manual retry)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Calendar and placement contract violations
    Scheduling,
    /// Status state-machine contract violations
    Lifecycle,
    /// External generation service failures
    Generation,
    /// Site connection and publish failures
    Publication,
    /// Persistence and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::Lifecycle => "lifecycle",
            Self::Generation => "generation",
            Self::Publication => "publication",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the plume crate
#[derive(Error, Debug)]
pub enum Error {
    /// Calendar placement and scheduling errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Content lifecycle state-machine errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Content generation errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Site connection and publish errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlumeErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(_) => false,
            Self::Lifecycle(_) => false,
            Self::Generation(e) => e.is_recoverable(),
            Self::Publish(e) => e.is_recoverable(),
            Self::Storage(_) => false,
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(_) => ErrorCategory::Scheduling,
            Self::Lifecycle(_) => ErrorCategory::Lifecycle,
            Self::Generation(_) => ErrorCategory::Generation,
            Self::Publish(_) | Self::Http(_) => ErrorCategory::Publication,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentStatus;
    use uuid::Uuid;

    #[test]
    fn test_error_category() {
        let sched: Error = SchedulerError::unknown_item(Uuid::new_v4()).into();
        assert_eq!(sched.category(), ErrorCategory::Scheduling);

        let lifecycle: Error = LifecycleError::IllegalTransition {
            from: ContentStatus::Draft,
            to: ContentStatus::Generating,
        }
        .into();
        assert_eq!(lifecycle.category(), ErrorCategory::Lifecycle);
    }

    #[test]
    fn test_contract_violations_not_recoverable() {
        let err: Error = LifecycleError::MissingContent { field: "body" }.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_operational_failures_recoverable() {
        let err: Error = GenerationError::Timeout { seconds: 60 }.into();
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Generation);
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("invalid spacing");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
    }
}

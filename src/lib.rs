//! plume - SEO content scheduling and publication engine
//!
//! The engine behind an SEO-content production workflow: accepted keywords
//! become content items on a calendar, items move through a
//! generation -> review -> publish lifecycle, and drafts are pushed to
//! connected sites through a verified connection.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and the status state machine
//! - [`scheduler`] - Calendar index, spacing policy, rescheduling
//! - [`workspace`] - Per-user session state and its locking discipline
//! - [`generation`] - Generation service client and orchestration
//! - [`publish`] - Site verification and publication
//! - [`storage`] - Persistence (SQLite, in-memory)
//! - [`server`] - HTTP API exposing workspace operations
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use plume::models::{Keyword, Trend};
//! use plume::scheduler::SchedulingAssigner;
//! use plume::workspace::Workspace;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let workspace = Arc::new(Workspace::new());
//!     let assigner = SchedulingAssigner::new();
//!     let keywords = vec![Keyword::new("seo local", 1200, 35, Trend::Up)?];
//!     let today = chrono::Utc::now().date_naive();
//!     let items = workspace.plan(&assigner, &keywords, today).await?;
//!     println!("planned {} items", items.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod publish;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod workspace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, PlumeErrorTrait, Result};
    pub use crate::generation::{GenerationOptions, GenerationOrchestrator};
    pub use crate::models::{
        ContentItem, ContentStatus, ContentType, Keyword, Site, SitePlatform, Trend,
    };
    pub use crate::publish::{PublicationCoordinator, PublishMode};
    pub use crate::scheduler::{CalendarIndex, SchedulingAssigner};
    pub use crate::workspace::Workspace;
}

// Direct re-exports for convenience
pub use models::{ContentItem, ContentStatus, ContentType, Keyword, Site, Trend};

//! Site connection and publication
//!
//! # Overview
//!
//! Publishing runs in two gated steps. Credentials are first verified with
//! [`PublicationCoordinator::test_connection`]; only a URL whose most recent
//! test succeeded can be stored via `connect` (idempotent per URL). A
//! `Draft` item can then be pushed to a connected site, either live
//! (`publish` mode, permalink recorded) or as a remote draft (`draft` mode,
//! no permalink). Publish failures move the item to `Failed` with the
//! platform's message verbatim and are never retried automatically: a
//! duplicate request could create a duplicate remote post.

use thiserror::Error;
use uuid::Uuid;

use crate::models::ContentStatus;

pub mod client;
pub mod coordinator;

pub use client::{ConnectionCheck, PostPayload, PublishReceipt, SiteApiClient, SiteClientConfig};
pub use coordinator::{CoordinatorConfig, PublicationCoordinator};

/// Publication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Write to the platform without going live (push-to-draft)
    Draft,
    /// Push live; the permalink is recorded on the item
    Publish,
}

impl PublishMode {
    /// Get string representation (also the wire value)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "publish" => Some(Self::Publish),
            _ => None,
        }
    }

    /// Status a successful push in this mode lands on
    pub fn target_status(&self) -> ContentStatus {
        match self {
            Self::Draft => ContentStatus::Draft,
            Self::Publish => ContentStatus::Published,
        }
    }
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from the publication boundary
#[derive(Debug, Error)]
pub enum PublishError {
    /// Network-level failure reaching the platform
    #[error("site request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Connect attempted without a prior successful connection test
    #[error("site '{url}' has not passed a connection test")]
    NotVerified { url: String },

    /// The platform rejected the publish; message is verbatim
    #[error("platform rejected the post ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The bounded wait elapsed before the platform answered
    #[error("publish timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// No site record with this id
    #[error("no connected site with id {site_id}")]
    UnknownSite { site_id: Uuid },
}

impl PublishError {
    /// Check if the error is recoverable (worth a manual retry)
    ///
    /// `NotVerified` and `UnknownSite` are caller mistakes; the rest are
    /// operational failures the user may retry explicitly.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::NotVerified { .. } | Self::UnknownSite { .. })
    }
}

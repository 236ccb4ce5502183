//! Publication coordination
//!
//! The coordinator gates everything that touches a remote site: credentials
//! must pass a connection test before they can be stored, and an item must
//! be publishable before any network call fires, so a rejected publish never
//! leaves a stray remote post behind.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    ContentItem, ContentStatus, LifecycleError, Site, SiteCredentials, SitePlatform, SiteStatus,
};
use crate::scheduler::SchedulerError;
use crate::workspace::Workspace;

use super::client::{ConnectionCheck, PostPayload, SiteApiClient};
use super::{PublishError, PublishMode};

/// Configuration for the publication coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bound on a publish call; elapsed => item fails with reason "timeout"
    pub timeout_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

/// Coordinates site verification and publication
pub struct PublicationCoordinator {
    workspace: Arc<Workspace>,
    client: SiteApiClient,
    config: CoordinatorConfig,
    /// URLs whose most recent connection test succeeded
    verified_urls: RwLock<HashSet<String>>,
}

impl PublicationCoordinator {
    /// Create a coordinator for a workspace
    pub fn new(workspace: Arc<Workspace>, client: SiteApiClient) -> Self {
        Self::with_config(workspace, client, CoordinatorConfig::default())
    }

    /// Create a coordinator with a custom config
    pub fn with_config(
        workspace: Arc<Workspace>,
        client: SiteApiClient,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            workspace,
            client,
            config,
            verified_urls: RwLock::new(HashSet::new()),
        }
    }

    /// Verify credentials against the target platform
    ///
    /// Records the outcome: only a URL whose most recent test succeeded may
    /// be connected, so a later failing test revokes earlier verification.
    pub async fn test_connection(
        &self,
        credentials: &SiteCredentials,
    ) -> Result<ConnectionCheck> {
        if let Err(e) = url::Url::parse(&credentials.url) {
            return Ok(ConnectionCheck {
                success: false,
                error: Some(format!("invalid site URL '{}': {}", credentials.url, e)),
            });
        }

        let check = self.client.test_connection(credentials).await?;

        let mut verified = self.verified_urls.write().await;
        if check.success {
            verified.insert(credentials.url.clone());
            tracing::info!(url = %credentials.url, "site connection verified");
        } else {
            verified.remove(&credentials.url);
            tracing::warn!(
                url = %credentials.url,
                reason = check.error.as_deref().unwrap_or("unknown"),
                "site connection test failed"
            );
        }
        Ok(check)
    }

    /// Persist a verified site record
    ///
    /// Rejected unless the URL passed its most recent connection test;
    /// unverified credentials are never stored. Idempotent per URL:
    /// connecting the same URL twice updates rather than duplicates.
    pub async fn connect(
        &self,
        platform: SitePlatform,
        credentials: SiteCredentials,
    ) -> Result<Site> {
        if !self.verified_urls.read().await.contains(&credentials.url) {
            return Err(PublishError::NotVerified {
                url: credentials.url,
            }
            .into());
        }

        let site = self
            .workspace
            .upsert_site(Site::new(platform, credentials))
            .await;
        tracing::info!(site_id = %site.id, url = %site.url, "site connected");
        Ok(site)
    }

    /// Push an item to a site, live or as a remote draft
    ///
    /// The item must be a `Draft` (or a failed publish with its draft body
    /// preserved — the explicit retry path). The check happens before the
    /// network call: an item that cannot take the resulting transition never
    /// reaches the remote, which would otherwise create an orphaned post.
    /// Failures are recorded verbatim on the item and never retried
    /// automatically.
    pub async fn publish(
        &self,
        item_id: Uuid,
        site_id: Uuid,
        mode: PublishMode,
    ) -> Result<ContentItem> {
        let item = self
            .workspace
            .item(item_id)
            .await
            .ok_or(SchedulerError::UnknownItem { item_id })?;
        let site = self
            .workspace
            .site(site_id)
            .await
            .ok_or(PublishError::UnknownSite { site_id })?;

        self.check_publishable(&item, mode)?;
        let payload = PostPayload::from_item(&item)
            .ok_or(LifecycleError::MissingContent { field: "body" })?;

        tracing::info!(%item_id, site = %site.url, mode = %mode, "publishing item");

        // Remote call without any workspace lock held.
        let outcome = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.client.publish(&site, &payload, mode),
        )
        .await;

        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(err)) => return self.fail(item_id, site_id, err).await,
            Err(_) => {
                return self
                    .fail(
                        item_id,
                        site_id,
                        PublishError::Timeout {
                            seconds: self.config.timeout_secs,
                        },
                    )
                    .await
            }
        };

        self.workspace
            .set_site_status(site_id, SiteStatus::Active)
            .await;

        match mode {
            PublishMode::Publish => {
                let url = receipt.url.ok_or_else(|| PublishError::Rejected {
                    status: 200,
                    message: "platform returned no permalink for a live publish".to_string(),
                })?;
                self.workspace.mark_published(item_id, url, site_id).await
            }
            PublishMode::Draft => self.workspace.mark_drafted(item_id, site_id).await,
        }
    }

    /// Explicit user-triggered retry of a failed publish
    ///
    /// Requires the preserved draft body; a generation failure has nothing
    /// to retry here and must go through generation instead.
    pub async fn retry_publish(
        &self,
        item_id: Uuid,
        site_id: Uuid,
        mode: PublishMode,
    ) -> Result<ContentItem> {
        self.publish(item_id, site_id, mode).await
    }

    fn check_publishable(&self, item: &ContentItem, mode: PublishMode) -> Result<()> {
        let allowed = item.status == ContentStatus::Draft || item.can_retry_publish();
        if !allowed {
            return Err(LifecycleError::IllegalTransition {
                from: item.status,
                to: mode.target_status(),
            }
            .into());
        }
        Ok(())
    }

    async fn fail(
        &self,
        item_id: Uuid,
        site_id: Uuid,
        err: PublishError,
    ) -> Result<ContentItem> {
        let reason = match &err {
            PublishError::Timeout { .. } => "timeout".to_string(),
            other => other.to_string(),
        };
        tracing::warn!(%item_id, %reason, "publish failed");

        self.workspace
            .set_site_status(site_id, SiteStatus::Error)
            .await;
        self.workspace.fail_item(item_id, reason).await?;
        Err(Error::Publish(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_target_status() {
        assert_eq!(PublishMode::Publish.target_status(), ContentStatus::Published);
        assert_eq!(PublishMode::Draft.target_status(), ContentStatus::Draft);
    }
}

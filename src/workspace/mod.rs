//! Per-user workspace owning the scheduling and content state
//!
//! A [`Workspace`] is the explicit session context for one user: their
//! calendar index, content items and connected sites. Workspaces are fully
//! isolated from each other; nothing here is shared across users.
//!
//! # Concurrency
//!
//! Calendar and item state live together behind a single `RwLock`, so every
//! mutation (place, move, status transition) is one serialized critical
//! section and the single-bucket invariant can never be observed broken.
//! Long-running network calls (generation, publish) must not hold the lock;
//! the orchestrator and coordinator read what they need, release, perform
//! the call, and re-acquire only for the terminal transition.

use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ContentItem, GeneratedContent, Keyword, Site, SiteStatus,
};
use crate::scheduler::{reschedule, CalendarIndex, SchedulerError, SchedulingAssigner};

/// Calendar and item state guarded as one unit
#[derive(Debug, Default)]
struct WorkspaceState {
    items: HashMap<Uuid, ContentItem>,
    calendar: CalendarIndex,
}

/// Isolated scheduling/content state belonging to one user
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    state: RwLock<WorkspaceState>,
    sites: RwLock<HashMap<Uuid, Site>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create an empty workspace with a fresh id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Create an empty workspace with a known id (e.g. from storage)
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            state: RwLock::new(WorkspaceState::default()),
            sites: RwLock::new(HashMap::new()),
        }
    }

    /// Get the workspace id
    pub fn id(&self) -> Uuid {
        self.id
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Plan and place one content item per accepted keyword
    ///
    /// Runs the assigner against the current calendar and applies all
    /// placements in one critical section. Returns the created items.
    pub async fn plan(
        &self,
        assigner: &SchedulingAssigner,
        keywords: &[Keyword],
        start_date: NaiveDate,
    ) -> Result<Vec<ContentItem>> {
        let mut state = self.state.write().await;
        let items = assigner.plan(keywords, start_date, &state.calendar)?;

        for item in &items {
            state.calendar.place(item.id, item.scheduled_date)?;
            state.items.insert(item.id, item.clone());
        }

        tracing::info!(
            workspace = %self.id,
            items = items.len(),
            start = %start_date,
            "scheduled keyword plan"
        );
        Ok(items)
    }

    /// Move an item between calendar dates
    ///
    /// The item's `scheduled_date` and calendar bucket update atomically;
    /// status is untouched.
    pub async fn reschedule(
        &self,
        item_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ContentItem> {
        let mut state = self.state.write().await;
        let WorkspaceState { items, calendar } = &mut *state;
        let item = items
            .get_mut(&item_id)
            .ok_or(SchedulerError::UnknownItem { item_id })?;

        reschedule(calendar, item, from, to)?;
        Ok(item.clone())
    }

    /// Delete an item, removing it from the calendar as well
    ///
    /// Returns the removed item, or `None` if no such item exists.
    /// Deleting an item that was never placed is valid; the calendar
    /// removal is a no-op in that case.
    pub async fn delete_item(&self, item_id: Uuid) -> Option<ContentItem> {
        let mut state = self.state.write().await;
        let item = state.items.remove(&item_id)?;
        state.calendar.remove(item_id);
        tracing::info!(workspace = %self.id, %item_id, "deleted content item");
        Some(item)
    }

    /// Insert an existing item (hydration from storage)
    pub async fn insert_item(&self, item: ContentItem) -> Result<()> {
        let mut state = self.state.write().await;
        state.calendar.place(item.id, item.scheduled_date)?;
        state.items.insert(item.id, item);
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a snapshot of an item
    pub async fn item(&self, item_id: Uuid) -> Option<ContentItem> {
        self.state.read().await.items.get(&item_id).cloned()
    }

    /// Get snapshots of all items
    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.read().await.items.values().cloned().collect()
    }

    /// Get the items on a date, in bucket order
    pub async fn items_on(&self, date: NaiveDate) -> Vec<ContentItem> {
        let state = self.state.read().await;
        state
            .calendar
            .items_on(date)
            .iter()
            .filter_map(|id| state.items.get(id).cloned())
            .collect()
    }

    /// Get a snapshot of the calendar index
    pub async fn calendar(&self) -> CalendarIndex {
        self.state.read().await.calendar.clone()
    }

    // ========================================================================
    // Lifecycle transitions
    // ========================================================================

    /// Move an item into `Generating`
    pub async fn begin_generation(&self, item_id: Uuid) -> Result<ContentItem> {
        self.with_item(item_id, |item| item.begin_generation().map_err(Into::into))
            .await
    }

    /// Apply generation output and move the item to `Draft`
    pub async fn complete_generation(
        &self,
        item_id: Uuid,
        content: GeneratedContent,
    ) -> Result<ContentItem> {
        self.with_item(item_id, |item| {
            item.complete_generation(content).map_err(Into::into)
        })
        .await
    }

    /// Record an operational failure on an item
    pub async fn fail_item(
        &self,
        item_id: Uuid,
        reason: impl Into<String>,
    ) -> Result<ContentItem> {
        let reason = reason.into();
        self.with_item(item_id, move |item| item.fail(reason).map_err(Into::into))
            .await
    }

    /// Record a successful live publish
    pub async fn mark_published(
        &self,
        item_id: Uuid,
        url: impl Into<String>,
        site_id: Uuid,
    ) -> Result<ContentItem> {
        let url = url.into();
        self.with_item(item_id, move |item| {
            item.mark_published(url, site_id).map_err(Into::into)
        })
        .await
    }

    /// Record a successful push-to-CMS-draft
    pub async fn mark_drafted(&self, item_id: Uuid, site_id: Uuid) -> Result<ContentItem> {
        self.with_item(item_id, move |item| {
            item.mark_drafted(site_id).map_err(Into::into)
        })
        .await
    }

    async fn with_item<F>(&self, item_id: Uuid, apply: F) -> Result<ContentItem>
    where
        F: FnOnce(&mut ContentItem) -> Result<()>,
    {
        let mut state = self.state.write().await;
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or(SchedulerError::UnknownItem { item_id })?;
        apply(item)?;
        Ok(item.clone())
    }

    // ========================================================================
    // Sites
    // ========================================================================

    /// Store a site, updating in place when the URL is already connected
    ///
    /// Idempotent per URL: reconnecting keeps the original id and
    /// `connected_at`, refreshing credentials, platform and status.
    pub async fn upsert_site(&self, site: Site) -> Site {
        let mut sites = self.sites.write().await;
        if let Some(existing) = sites.values_mut().find(|s| s.url == site.url) {
            existing.platform = site.platform;
            existing.credentials = site.credentials;
            existing.verified = site.verified;
            existing.status = site.status;
            return existing.clone();
        }
        sites.insert(site.id, site.clone());
        site
    }

    /// Get a snapshot of a site
    pub async fn site(&self, site_id: Uuid) -> Option<Site> {
        self.sites.read().await.get(&site_id).cloned()
    }

    /// Find a site by URL
    pub async fn site_by_url(&self, url: &str) -> Option<Site> {
        self.sites
            .read()
            .await
            .values()
            .find(|s| s.url == url)
            .cloned()
    }

    /// Get snapshots of all connected sites
    pub async fn sites(&self) -> Vec<Site> {
        self.sites.read().await.values().cloned().collect()
    }

    /// Update a site's health status
    pub async fn set_site_status(&self, site_id: Uuid, status: SiteStatus) -> Option<Site> {
        let mut sites = self.sites.write().await;
        let site = sites.get_mut(&site_id)?;
        site.status = status;
        Some(site.clone())
    }
}

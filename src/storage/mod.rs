//! Persistence for content items and sites
//!
//! Repository traits decouple the engine from storage so that business
//! logic can run against SQLite in production and an in-memory mock in
//! tests. Records are keyed by workspace id; within one workspace reads
//! and writes are strongly consistent.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        Workspace / Coordinator logic        │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//! ┌─────────────────────────────────────────────┐
//! │    ContentRepository / SiteRepository       │
//! └──────────┬──────────────────────┬───────────┘
//!            ▼                      ▼
//!   ┌─────────────────┐   ┌─────────────────┐
//!   │     SQLite      │   │    In-memory    │
//!   └─────────────────┘   └─────────────────┘
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ContentItem, Site};
use crate::workspace::Workspace;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database errors
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record (de)serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// Repository Traits
// ============================================================================

/// Repository for content item records
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert or update an item
    async fn save_item(&self, workspace_id: Uuid, item: &ContentItem) -> StorageResult<()>;

    /// Load a single item
    async fn get_item(&self, workspace_id: Uuid, item_id: Uuid)
        -> StorageResult<Option<ContentItem>>;

    /// Load all items in a workspace
    async fn load_items(&self, workspace_id: Uuid) -> StorageResult<Vec<ContentItem>>;

    /// Delete an item; returns whether a record existed
    async fn delete_item(&self, workspace_id: Uuid, item_id: Uuid) -> StorageResult<bool>;
}

/// Repository for connected site records
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Insert or update a site
    async fn save_site(&self, workspace_id: Uuid, site: &Site) -> StorageResult<()>;

    /// Load all sites in a workspace
    async fn load_sites(&self, workspace_id: Uuid) -> StorageResult<Vec<Site>>;

    /// Delete a site; returns whether a record existed
    async fn delete_site(&self, workspace_id: Uuid, site_id: Uuid) -> StorageResult<bool>;
}

/// Rebuild a workspace from its persisted records
pub async fn hydrate_workspace(
    workspace_id: Uuid,
    items: &dyn ContentRepository,
    sites: &dyn SiteRepository,
) -> crate::error::Result<Workspace> {
    let workspace = Workspace::with_id(workspace_id);
    for item in items.load_items(workspace_id).await? {
        workspace.insert_item(item).await?;
    }
    for site in sites.load_sites(workspace_id).await? {
        workspace.upsert_site(site).await;
    }
    Ok(workspace)
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite-backed store implementing both repositories
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) a store at the given path
    pub fn new(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory SQLite store (tests, ephemeral runs)
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> StorageResult<()> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS content_items (
                id TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                status TEXT NOT NULL,
                scheduled_date TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (workspace_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_items_workspace
                ON content_items (workspace_id);
            CREATE TABLE IF NOT EXISTS sites (
                id TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                url TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (workspace_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_sites_workspace
                ON sites (workspace_id);",
        )?;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for SqliteStore {
    async fn save_item(&self, workspace_id: Uuid, item: &ContentItem) -> StorageResult<()> {
        let data = serde_json::to_string(item)?;
        let conn = self.conn.lock().expect("storage mutex poisoned");
        conn.execute(
            "INSERT INTO content_items (id, workspace_id, status, scheduled_date, data)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (workspace_id, id) DO UPDATE SET
                 status = excluded.status,
                 scheduled_date = excluded.scheduled_date,
                 data = excluded.data",
            params![
                item.id.to_string(),
                workspace_id.to_string(),
                item.status.as_str(),
                item.scheduled_date.to_string(),
                data
            ],
        )?;
        Ok(())
    }

    async fn get_item(
        &self,
        workspace_id: Uuid,
        item_id: Uuid,
    ) -> StorageResult<Option<ContentItem>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM content_items WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.to_string(), item_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn load_items(&self, workspace_id: Uuid) -> StorageResult<Vec<ContentItem>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT data FROM content_items WHERE workspace_id = ?1
             ORDER BY scheduled_date, id",
        )?;
        let rows = stmt.query_map(params![workspace_id.to_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(serde_json::from_str(&row?)?);
        }
        Ok(items)
    }

    async fn delete_item(&self, workspace_id: Uuid, item_id: Uuid) -> StorageResult<bool> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let affected = conn.execute(
            "DELETE FROM content_items WHERE workspace_id = ?1 AND id = ?2",
            params![workspace_id.to_string(), item_id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl SiteRepository for SqliteStore {
    async fn save_site(&self, workspace_id: Uuid, site: &Site) -> StorageResult<()> {
        let data = serde_json::to_string(site)?;
        let conn = self.conn.lock().expect("storage mutex poisoned");
        conn.execute(
            "INSERT INTO sites (id, workspace_id, url, data)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (workspace_id, id) DO UPDATE SET
                 url = excluded.url,
                 data = excluded.data",
            params![
                site.id.to_string(),
                workspace_id.to_string(),
                site.url,
                data
            ],
        )?;
        Ok(())
    }

    async fn load_sites(&self, workspace_id: Uuid) -> StorageResult<Vec<Site>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT data FROM sites WHERE workspace_id = ?1 ORDER BY url")?;
        let rows = stmt.query_map(params![workspace_id.to_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut sites = Vec::new();
        for row in rows {
            sites.push(serde_json::from_str(&row?)?);
        }
        Ok(sites)
    }

    async fn delete_site(&self, workspace_id: Uuid, site_id: Uuid) -> StorageResult<bool> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let affected = conn.execute(
            "DELETE FROM sites WHERE workspace_id = ?1 AND id = ?2",
            params![workspace_id.to_string(), site_id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ============================================================================
// In-memory Implementation
// ============================================================================

/// In-memory store for tests and ephemeral workspaces
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<(Uuid, Uuid), ContentItem>>,
    sites: Mutex<HashMap<(Uuid, Uuid), Site>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn save_item(&self, workspace_id: Uuid, item: &ContentItem) -> StorageResult<()> {
        self.items
            .lock()
            .expect("storage mutex poisoned")
            .insert((workspace_id, item.id), item.clone());
        Ok(())
    }

    async fn get_item(
        &self,
        workspace_id: Uuid,
        item_id: Uuid,
    ) -> StorageResult<Option<ContentItem>> {
        Ok(self
            .items
            .lock()
            .expect("storage mutex poisoned")
            .get(&(workspace_id, item_id))
            .cloned())
    }

    async fn load_items(&self, workspace_id: Uuid) -> StorageResult<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = self
            .items
            .lock()
            .expect("storage mutex poisoned")
            .iter()
            .filter(|((ws, _), _)| *ws == workspace_id)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by_key(|item| (item.scheduled_date, item.id));
        Ok(items)
    }

    async fn delete_item(&self, workspace_id: Uuid, item_id: Uuid) -> StorageResult<bool> {
        Ok(self
            .items
            .lock()
            .expect("storage mutex poisoned")
            .remove(&(workspace_id, item_id))
            .is_some())
    }
}

#[async_trait]
impl SiteRepository for MemoryStore {
    async fn save_site(&self, workspace_id: Uuid, site: &Site) -> StorageResult<()> {
        self.sites
            .lock()
            .expect("storage mutex poisoned")
            .insert((workspace_id, site.id), site.clone());
        Ok(())
    }

    async fn load_sites(&self, workspace_id: Uuid) -> StorageResult<Vec<Site>> {
        let mut sites: Vec<Site> = self
            .sites
            .lock()
            .expect("storage mutex poisoned")
            .iter()
            .filter(|((ws, _), _)| *ws == workspace_id)
            .map(|(_, site)| site.clone())
            .collect();
        sites.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(sites)
    }

    async fn delete_site(&self, workspace_id: Uuid, site_id: Uuid) -> StorageResult<bool> {
        Ok(self
            .sites
            .lock()
            .expect("storage mutex poisoned")
            .remove(&(workspace_id, site_id))
            .is_some())
    }
}

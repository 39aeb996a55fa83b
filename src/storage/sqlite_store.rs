use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{LinkItemUpdate, LinkItemVersion, LinkStore};
use crate::entity::{Asset, AssetKind, LinkItem, Page, DEFAULT_SORT};
use crate::error::{LinkItemError, Result};
use crate::resolver::EntityUrls;

const LINKITEM_DIR: &str = ".linkitem";
const LINKS_DB: &str = "links.db";

const DRAFT_TABLE: &str = "link_items";
const LIVE_TABLE: &str = "link_items_live";

const ITEM_COLUMNS: &str = "id, title, link_type, target, anchor, internal_link, external_link, \
     email, telephone, file_id, image_id, sort_order, created_at, updated_at";

/// SQLite-backed link item store
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Initialize a new linkitem project
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(LINKITEM_DIR);

        if dir.exists() {
            return Err(LinkItemError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;

        let path = dir.join(LINKS_DB);
        let conn = Connection::open(&path)?;
        let store = Self {
            conn,
            path: Some(path),
        };
        store.init_schema()?;
        debug!(root = %root.display(), "initialized linkitem project");
        Ok(store)
    }

    /// Open an existing linkitem project
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(LINKITEM_DIR).join(LINKS_DB);

        if !path.exists() {
            return Err(LinkItemError::NotInitialized);
        }

        let conn = Connection::open(&path)?;
        let store = Self {
            conn,
            path: Some(path),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// A store that lives only as long as the value
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// The `.linkitem` directory, for file-backed stores
    pub fn project_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS pages (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                filename TEXT NOT NULL,
                url TEXT NOT NULL,
                published INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Draft and live stages share one layout
        for table in [DRAFT_TABLE, LIVE_TABLE] {
            self.conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        title TEXT NOT NULL,
                        link_type TEXT,
                        target TEXT,
                        anchor TEXT,
                        internal_link TEXT,
                        external_link TEXT,
                        email TEXT,
                        telephone TEXT,
                        file_id TEXT,
                        image_id TEXT,
                        sort_order INTEGER NOT NULL DEFAULT 0,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )"
                ),
                [],
            )?;
        }

        self.conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{DRAFT_TABLE}_sort ON {DRAFT_TABLE}({DEFAULT_SORT})"
            ),
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS link_item_versions (
                item_id TEXT NOT NULL,
                version INTEGER NOT NULL,
                published INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                snapshot TEXT NOT NULL,
                PRIMARY KEY (item_id, version)
            )",
            [],
        )?;

        Ok(())
    }

    fn require_item(&self, id: &Uuid) -> Result<LinkItem> {
        read_item(&self.conn, DRAFT_TABLE, id)?
            .ok_or_else(|| LinkItemError::EntityNotFound(id.to_string()))
    }
}

impl LinkStore for SqliteStore {
    fn save_item(&self, item: &LinkItem) -> Result<u32> {
        let tx = self.conn.unchecked_transaction()?;
        check_asset_links(&tx, item)?;
        write_item(&tx, DRAFT_TABLE, item)?;
        let version = record_version(&tx, item)?;
        tx.commit()?;

        debug!(id = %item.id, version, "saved link item");
        Ok(version)
    }

    fn get_item(&self, id: &Uuid) -> Result<Option<LinkItem>> {
        read_item(&self.conn, DRAFT_TABLE, id)
    }

    fn get_live_item(&self, id: &Uuid) -> Result<Option<LinkItem>> {
        read_item(&self.conn, LIVE_TABLE, id)
    }

    fn find_item(&self, prefix: &str) -> Result<LinkItem> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(LinkItemError::EntityNotFound(prefix));
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {DRAFT_TABLE} WHERE id LIKE ?1 ORDER BY id LIMIT 2"
        ))?;
        let ids = stmt
            .query_map([format!("{}%", prefix)], |row| uuid_at(row, 0))?
            .collect::<rusqlite::Result<Vec<Uuid>>>()?;

        match ids.as_slice() {
            [] => Err(LinkItemError::EntityNotFound(prefix)),
            [id] => self.require_item(id),
            _ => Err(LinkItemError::AmbiguousId(prefix)),
        }
    }

    fn list_items(&self) -> Result<Vec<LinkItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM {DRAFT_TABLE} ORDER BY {DEFAULT_SORT} ASC, created_at ASC"
        ))?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn update_item(&self, id: &Uuid, update: LinkItemUpdate) -> Result<LinkItem> {
        let mut item = self.require_item(id)?;
        update.apply_to(&mut item);
        self.save_item(&item)?;
        Ok(item)
    }

    fn delete_item(&self, id: &Uuid) -> Result<()> {
        let draft = self.get_item(id)?;
        let live = self.get_live_item(id)?;
        if draft.is_none() && live.is_none() {
            return Err(LinkItemError::EntityNotFound(id.to_string()));
        }

        let mut owned: Vec<Uuid> = draft
            .iter()
            .chain(live.iter())
            .flat_map(LinkItem::owned_assets)
            .collect();
        owned.sort();
        owned.dedup();

        let tx = self.conn.unchecked_transaction()?;
        for table in [DRAFT_TABLE, LIVE_TABLE] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE id = ?1"),
                [id.to_string()],
            )?;
        }
        for asset_id in &owned {
            tx.execute("DELETE FROM assets WHERE id = ?1", [asset_id.to_string()])?;
        }
        tx.commit()?;

        debug!(%id, cascaded = owned.len(), "deleted link item");
        Ok(())
    }

    fn duplicate_item(&self, id: &Uuid) -> Result<LinkItem> {
        let source = self.require_item(id)?;

        let now = Utc::now();
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.created_at = now;
        copy.updated_at = now;

        let tx = self.conn.unchecked_transaction()?;
        copy.file = match source.file {
            Some(asset_id) => duplicate_asset(&tx, &asset_id)?,
            None => None,
        };
        copy.image = match source.image {
            Some(asset_id) => duplicate_asset(&tx, &asset_id)?,
            None => None,
        };
        write_item(&tx, DRAFT_TABLE, &copy)?;
        record_version(&tx, &copy)?;
        tx.commit()?;

        debug!(source = %id, copy = %copy.id, "duplicated link item");
        Ok(copy)
    }

    fn publish_item(&self, id: &Uuid) -> Result<u32> {
        let item = self.require_item(id)?;

        let tx = self.conn.unchecked_transaction()?;
        write_item(&tx, LIVE_TABLE, &item)?;

        let version = match latest_version(&tx, id)? {
            Some(version) => version,
            None => record_version(&tx, &item)?,
        };
        tx.execute(
            "UPDATE link_item_versions SET published = 1 WHERE item_id = ?1 AND version = ?2",
            params![id.to_string(), version],
        )?;

        let owned = item.owned_assets();
        for asset_id in &owned {
            tx.execute(
                "UPDATE assets SET published = 1 WHERE id = ?1",
                [asset_id.to_string()],
            )?;
        }
        tx.commit()?;

        debug!(%id, version, assets = owned.len(), "published link item");
        Ok(version)
    }

    fn versions(&self, id: &Uuid) -> Result<Vec<LinkItemVersion>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, version, published, created_at, snapshot
             FROM link_item_versions WHERE item_id = ?1 ORDER BY version ASC",
        )?;
        let versions = stmt
            .query_map([id.to_string()], row_to_version)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(versions)
    }

    fn rollback_item(&self, id: &Uuid, version: u32) -> Result<LinkItem> {
        let recorded = self
            .conn
            .query_row(
                "SELECT item_id, version, published, created_at, snapshot
                 FROM link_item_versions WHERE item_id = ?1 AND version = ?2",
                params![id.to_string(), version],
                row_to_version,
            )
            .optional()?
            .ok_or_else(|| LinkItemError::VersionNotFound {
                id: id.to_string(),
                version,
            })?;

        let mut item = recorded.item;
        item.updated_at = Utc::now();
        let new_version = self.save_item(&item)?;

        debug!(%id, from = version, to = new_version, "rolled back link item");
        Ok(item)
    }

    fn add_page(&self, page: &Page) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO pages (id, title, url) VALUES (?1, ?2, ?3)",
            params![page.id.to_string(), page.title, page.url],
        )?;
        Ok(())
    }

    fn get_page(&self, id: &Uuid) -> Result<Option<Page>> {
        let page = self
            .conn
            .query_row(
                "SELECT id, title, url FROM pages WHERE id = ?1",
                [id.to_string()],
                row_to_page,
            )
            .optional()?;
        Ok(page)
    }

    fn list_pages(&self) -> Result<Vec<Page>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, url FROM pages ORDER BY title ASC")?;
        let pages = stmt
            .query_map([], row_to_page)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pages)
    }

    fn add_asset(&self, asset: &Asset) -> Result<()> {
        write_asset(&self.conn, asset)
    }

    fn get_asset(&self, id: &Uuid) -> Result<Option<Asset>> {
        read_asset(&self.conn, id)
    }

    fn list_assets(&self) -> Result<Vec<Asset>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, filename, url, published FROM assets ORDER BY filename ASC",
        )?;
        let assets = stmt
            .query_map([], row_to_asset)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assets)
    }
}

impl EntityUrls for SqliteStore {
    fn page_url(&self, id: &Uuid) -> Option<String> {
        match self.get_page(id) {
            Ok(page) => page.map(|p| p.url),
            Err(e) => {
                warn!(%id, error = %e, "failed to load page");
                None
            }
        }
    }

    fn asset_url(&self, id: &Uuid) -> Option<String> {
        match self.get_asset(id) {
            Ok(asset) => asset.map(|a| a.url),
            Err(e) => {
                warn!(%id, error = %e, "failed to load asset");
                None
            }
        }
    }
}

fn write_item(conn: &Connection, table: &str, item: &LinkItem) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {table} ({ITEM_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            item.id.to_string(),
            item.title,
            item.link_type.map(|t| t.as_str()),
            item.target,
            item.anchor,
            item.internal_link.map(|id| id.to_string()),
            item.external_link,
            item.email,
            item.telephone,
            item.file.map(|id| id.to_string()),
            item.image.map(|id| id.to_string()),
            item.sort_order,
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn read_item(conn: &Connection, table: &str, id: &Uuid) -> Result<Option<LinkItem>> {
    let item = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM {table} WHERE id = ?1"),
            [id.to_string()],
            row_to_item,
        )
        .optional()?;
    Ok(item)
}

fn latest_version(conn: &Connection, id: &Uuid) -> Result<Option<u32>> {
    let version: Option<u32> = conn.query_row(
        "SELECT MAX(version) FROM link_item_versions WHERE item_id = ?1",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn record_version(conn: &Connection, item: &LinkItem) -> Result<u32> {
    let version = latest_version(conn, &item.id)?.unwrap_or(0) + 1;
    let snapshot = serde_json::to_string(item)?;
    conn.execute(
        "INSERT INTO link_item_versions (item_id, version, published, created_at, snapshot)
         VALUES (?1, ?2, 0, ?3, ?4)",
        params![item.id.to_string(), version, Utc::now().to_rfc3339(), snapshot],
    )?;
    Ok(version)
}

fn write_asset(conn: &Connection, asset: &Asset) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO assets (id, kind, filename, url, published)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            asset.id.to_string(),
            asset.kind.to_string(),
            asset.filename,
            asset.url,
            asset.published,
        ],
    )?;
    Ok(())
}

fn read_asset(conn: &Connection, id: &Uuid) -> Result<Option<Asset>> {
    let asset = conn
        .query_row(
            "SELECT id, kind, filename, url, published FROM assets WHERE id = ?1",
            [id.to_string()],
            row_to_asset,
        )
        .optional()?;
    Ok(asset)
}

/// A file or image link must point at an asset of the matching kind that no
/// other item's draft or live row owns. Missing assets are let through and
/// resolve to "".
fn check_asset_links(conn: &Connection, item: &LinkItem) -> Result<()> {
    for (asset_id, expected) in [(item.file, AssetKind::File), (item.image, AssetKind::Image)] {
        let Some(asset_id) = asset_id else {
            continue;
        };

        if let Some(asset) = read_asset(conn, &asset_id)? {
            if asset.kind != expected {
                return Err(LinkItemError::InvalidAssetKind(format!(
                    "{} is {}, expected {}",
                    asset_id, asset.kind, expected
                )));
            }
        }

        if let Some(owner) = asset_owner(conn, &asset_id, &item.id)? {
            return Err(LinkItemError::AssetOwned {
                asset: asset_id.to_string(),
                owner: owner.to_string(),
            });
        }
    }
    Ok(())
}

/// The item, other than `except`, whose draft or live row links the asset
fn asset_owner(conn: &Connection, asset_id: &Uuid, except: &Uuid) -> Result<Option<Uuid>> {
    for table in [DRAFT_TABLE, LIVE_TABLE] {
        let owner = conn
            .query_row(
                &format!(
                    "SELECT id FROM {table}
                     WHERE id != ?1 AND (file_id = ?2 OR image_id = ?2) LIMIT 1"
                ),
                params![except.to_string(), asset_id.to_string()],
                |row| uuid_at(row, 0),
            )
            .optional()?;
        if owner.is_some() {
            return Ok(owner);
        }
    }
    Ok(None)
}

/// Copy an asset under a new id. The copy starts unpublished. A reference to
/// a missing asset is not carried over.
fn duplicate_asset(conn: &Connection, id: &Uuid) -> Result<Option<Uuid>> {
    let Some(mut asset) = read_asset(conn, id)? else {
        return Ok(None);
    };
    asset.id = Uuid::new_v4();
    asset.published = false;
    write_asset(conn, &asset)?;
    Ok(Some(asset.id))
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn optional_uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn row_to_item(row: &Row) -> rusqlite::Result<LinkItem> {
    let id = uuid_at(row, 0)?;

    let raw_type: Option<String> = row.get(2)?;
    let link_type = raw_type.and_then(|raw| match raw.parse() {
        Ok(link_type) => Some(link_type),
        Err(_) => {
            if !raw.is_empty() {
                warn!(%id, link_type = %raw, "unknown link type, treating as unset");
            }
            None
        }
    });

    Ok(LinkItem {
        id,
        title: row.get(1)?,
        link_type,
        target: row.get(3)?,
        anchor: row.get(4)?,
        internal_link: optional_uuid_at(row, 5)?,
        external_link: row.get(6)?,
        email: row.get(7)?,
        telephone: row.get(8)?,
        file: optional_uuid_at(row, 9)?,
        image: optional_uuid_at(row, 10)?,
        sort_order: row.get(11)?,
        created_at: timestamp_at(row, 12)?,
        updated_at: timestamp_at(row, 13)?,
    })
}

fn row_to_version(row: &Row) -> rusqlite::Result<LinkItemVersion> {
    let snapshot: String = row.get(4)?;
    let item: LinkItem = serde_json::from_str(&snapshot).map_err(|e| conversion_error(4, e))?;

    Ok(LinkItemVersion {
        item_id: uuid_at(row, 0)?,
        version: row.get(1)?,
        published: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
        item,
    })
}

fn row_to_page(row: &Row) -> rusqlite::Result<Page> {
    Ok(Page {
        id: uuid_at(row, 0)?,
        title: row.get(1)?,
        url: row.get(2)?,
    })
}

fn row_to_asset(row: &Row) -> rusqlite::Result<Asset> {
    let kind: String = row.get(1)?;
    let kind: AssetKind = kind.parse().map_err(|e: String| conversion_error(1, e))?;

    Ok(Asset {
        id: uuid_at(row, 0)?,
        kind,
        filename: row.get(2)?,
        url: row.get(3)?,
        published: row.get(4)?,
    })
}

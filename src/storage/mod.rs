//! Persistence for link items and the pages and assets they reference.
//!
//! The record types stay plain data; saving, versioning, publishing, and the
//! ownership cascades are methods of a [`LinkStore`].

mod sqlite_store;

pub use sqlite_store::SqliteStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{Asset, LinkItem, LinkType, Page};
use crate::error::Result;

/// Update payload for a link item
#[derive(Debug, Default)]
pub struct LinkItemUpdate {
    pub title: Option<String>,
    pub link_type: Option<LinkType>,
    pub target: Option<Option<String>>, // Some(None) to clear, Some(Some(s)) to set
    pub anchor: Option<Option<String>>,
    pub internal_link: Option<Option<Uuid>>,
    pub external_link: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub telephone: Option<Option<String>>,
    pub file: Option<Option<Uuid>>,
    pub image: Option<Option<Uuid>>,
    pub sort_order: Option<i64>,
}

impl LinkItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.link_type.is_none()
            && self.target.is_none()
            && self.anchor.is_none()
            && self.internal_link.is_none()
            && self.external_link.is_none()
            && self.email.is_none()
            && self.telephone.is_none()
            && self.file.is_none()
            && self.image.is_none()
            && self.sort_order.is_none()
    }

    /// Apply the update to an item, bumping `updated_at`
    pub fn apply_to(self, item: &mut LinkItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(link_type) = self.link_type {
            item.link_type = Some(link_type);
        }
        if let Some(target) = self.target {
            item.target = target;
        }
        if let Some(anchor) = self.anchor {
            item.anchor = anchor;
        }
        if let Some(internal_link) = self.internal_link {
            item.internal_link = internal_link;
        }
        if let Some(external_link) = self.external_link {
            item.external_link = external_link;
        }
        if let Some(email) = self.email {
            item.email = email;
        }
        if let Some(telephone) = self.telephone {
            item.telephone = telephone;
        }
        if let Some(file) = self.file {
            item.file = file;
        }
        if let Some(image) = self.image {
            item.image = image;
        }
        if let Some(sort_order) = self.sort_order {
            item.sort_order = sort_order;
        }
        item.updated_at = Utc::now();
    }
}

/// A recorded write of a link item
#[derive(Debug, Clone, Serialize)]
pub struct LinkItemVersion {
    pub item_id: Uuid,
    pub version: u32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub item: LinkItem,
}

/// Storage for link items.
///
/// Items have a draft stage (what editors change) and a live stage (what was
/// last published). Every write to the draft is recorded as a version. A link
/// item owns its file and image assets: deleting, duplicating, or publishing
/// the item does the same to them.
pub trait LinkStore {
    /// Insert or update the draft, returning the new version number. Fails
    /// if the file or image is of the wrong kind or owned by another item.
    fn save_item(&self, item: &LinkItem) -> Result<u32>;

    fn get_item(&self, id: &Uuid) -> Result<Option<LinkItem>>;

    fn get_live_item(&self, id: &Uuid) -> Result<Option<LinkItem>>;

    /// Find a draft item by full id or unique id prefix
    fn find_item(&self, prefix: &str) -> Result<LinkItem>;

    /// All draft items, ordered by sort order
    fn list_items(&self) -> Result<Vec<LinkItem>>;

    fn update_item(&self, id: &Uuid, update: LinkItemUpdate) -> Result<LinkItem>;

    /// Delete both stages and the owned assets
    fn delete_item(&self, id: &Uuid) -> Result<()>;

    /// Copy an item and its owned assets under new ids
    fn duplicate_item(&self, id: &Uuid) -> Result<LinkItem>;

    /// Copy the draft to the live stage and publish the owned assets
    fn publish_item(&self, id: &Uuid) -> Result<u32>;

    /// Recorded versions, oldest first
    fn versions(&self, id: &Uuid) -> Result<Vec<LinkItemVersion>>;

    /// Restore the draft from a recorded version, recording a new version
    fn rollback_item(&self, id: &Uuid, version: u32) -> Result<LinkItem>;

    fn add_page(&self, page: &Page) -> Result<()>;

    fn get_page(&self, id: &Uuid) -> Result<Option<Page>>;

    fn list_pages(&self) -> Result<Vec<Page>>;

    fn add_asset(&self, asset: &Asset) -> Result<()>;

    fn get_asset(&self, id: &Uuid) -> Result<Option<Asset>>;

    fn list_assets(&self) -> Result<Vec<Asset>>;
}

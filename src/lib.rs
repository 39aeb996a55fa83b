pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod hooks;
pub mod resolver;
pub mod storage;
pub mod validation;

pub use config::LinkItemConfig;
pub use entity::{Asset, AssetKind, Choices, LinkItem, LinkType, Page};
pub use error::{LinkItemError, Result};
pub use resolver::{resolve_link, EntityUrls, LinkResolver};
pub use storage::{LinkStore, SqliteStore};

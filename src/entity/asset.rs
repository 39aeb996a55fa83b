// src/entity/asset.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site page an internal link can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    /// The page's own link, e.g. "/about/"
    pub url: String,
}

impl Page {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    File,
    Image,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::File => write!(f, "file"),
            AssetKind::Image => write!(f, "image"),
        }
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(AssetKind::File),
            "image" => Ok(AssetKind::Image),
            _ => Err(format!("Invalid asset kind: {}", s)),
        }
    }
}

/// An uploaded file or image. Link items own the assets they reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub kind: AssetKind,
    pub filename: String,
    pub url: String,
    pub published: bool,
}

impl Asset {
    pub fn new(kind: AssetKind, filename: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            filename,
            url,
            published: false,
        }
    }
}

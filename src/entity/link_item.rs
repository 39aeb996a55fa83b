// src/entity/link_item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const SINGULAR_NAME: &str = "Link Item";
pub const PLURAL_NAME: &str = "Link Items";
/// Column sibling link items are ordered by, ascending
pub const DEFAULT_SORT: &str = "sort_order";
/// Columns shown when link items are listed: (field, label)
pub const SUMMARY_FIELDS: [(&str, &str); 2] = [("Title", "Title"), ("Link", "Link")];

/// The kind of destination a link item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Anchor,
    Internal,
    External,
    Email,
    Telephone,
    File,
    Image,
}

impl LinkType {
    /// All link types in menu order
    pub const ALL: [LinkType; 7] = [
        LinkType::Anchor,
        LinkType::Internal,
        LinkType::External,
        LinkType::Email,
        LinkType::Telephone,
        LinkType::File,
        LinkType::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Anchor => "anchor",
            LinkType::Internal => "internal",
            LinkType::External => "external",
            LinkType::Email => "email",
            LinkType::Telephone => "telephone",
            LinkType::File => "file",
            LinkType::Image => "image",
        }
    }

    /// Human label shown in the link type menu
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::Anchor => "Anchor link",
            LinkType::Internal => "Internal Link",
            LinkType::External => "External Link",
            LinkType::Email => "Email",
            LinkType::Telephone => "Telephone",
            LinkType::File => "File",
            LinkType::Image => "Image",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Tags are stored machine values, so matching is exact.
impl std::str::FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid link type: {}", s))
    }
}

/// Unparseable tags deserialize as unset rather than failing the whole record.
fn lenient_link_type<'de, D>(deserializer: D) -> Result<Option<LinkType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// A polymorphic hyperlink record.
///
/// Only the field selected by `link_type` is meaningful; the others may hold
/// stale editor input and are ignored when resolving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_link_type")]
    pub link_type: Option<LinkType>,
    /// HTML target attribute, e.g. "_blank"
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    /// Page id
    #[serde(default)]
    pub internal_link: Option<Uuid>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    /// Owned file asset id
    #[serde(default)]
    pub file: Option<Uuid>,
    /// Owned image asset id
    #[serde(default)]
    pub image: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkItem {
    pub fn new(title: String, link_type: LinkType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            link_type: Some(link_type),
            target: None,
            anchor: None,
            internal_link: None,
            external_link: None,
            email: None,
            telephone: None,
            file: None,
            image: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Asset ids this item owns. Deleting, duplicating, or publishing the
    /// item carries these along.
    pub fn owned_assets(&self) -> Vec<Uuid> {
        self.file.into_iter().chain(self.image).collect()
    }

    /// Link items are publicly viewable, with or without a member.
    pub fn can_view(&self, _member: Option<&str>) -> bool {
        true
    }
}

/// The summary columns for a link item: its title and resolved link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    pub id: Uuid,
    pub title: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_round_trips_through_str() {
        for link_type in LinkType::ALL {
            assert_eq!(link_type.as_str().parse::<LinkType>(), Ok(link_type));
        }
    }

    #[test]
    fn test_link_type_parse_is_exact() {
        assert!("Email".parse::<LinkType>().is_err());
        assert!("".parse::<LinkType>().is_err());
        assert!("ftp".parse::<LinkType>().is_err());
    }

    #[test]
    fn test_owned_assets() {
        let mut item = LinkItem::new("Brochure".to_string(), LinkType::File);
        assert!(item.owned_assets().is_empty());

        let file = Uuid::new_v4();
        let image = Uuid::new_v4();
        item.file = Some(file);
        item.image = Some(image);
        assert_eq!(item.owned_assets(), vec![file, image]);
    }

    #[test]
    fn test_anyone_can_view() {
        let item = LinkItem::new("Home".to_string(), LinkType::Internal);
        assert!(item.can_view(None));
        assert!(item.can_view(Some("editor@example.com")));
    }

    #[test]
    fn test_unknown_link_type_deserializes_as_unset() {
        let item = LinkItem::new("Mail".to_string(), LinkType::Email);
        let mut json = serde_json::to_value(&item).unwrap();
        json["link_type"] = serde_json::Value::String("carrier-pigeon".to_string());

        let parsed: LinkItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.link_type, None);
        assert_eq!(parsed.title, "Mail");
    }

    #[test]
    fn test_serializes_link_type_lowercase() {
        let item = LinkItem::new("Call".to_string(), LinkType::Telephone);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["link_type"], "telephone");
    }
}

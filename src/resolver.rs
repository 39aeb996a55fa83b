//! Link resolution.
//!
//! Turns a [`LinkItem`] into the URL string a page renders. Resolution never
//! fails: missing fields and unresolvable references produce degraded output
//! (`""`, `"#"`, `"mailto:"`, ...) so a half-edited link cannot break a page.

use uuid::Uuid;

use crate::entity::{Choices, LinkItem, LinkSummary, LinkType};
use crate::hooks::Hooks;

/// Resolves referenced pages and assets to their URLs.
///
/// `None` means the entity is missing or has no URL; the resolver renders it
/// as an empty string.
pub trait EntityUrls {
    fn page_url(&self, id: &Uuid) -> Option<String>;
    fn asset_url(&self, id: &Uuid) -> Option<String>;
}

/// A resolver for links that never reference pages or assets.
pub struct NoEntities;

impl EntityUrls for NoEntities {
    fn page_url(&self, _id: &Uuid) -> Option<String> {
        None
    }

    fn asset_url(&self, _id: &Uuid) -> Option<String> {
        None
    }
}

/// Core dispatch from link type to URL, without hooks.
pub fn resolve_link(item: &LinkItem, urls: &dyn EntityUrls) -> String {
    let text = |field: &Option<String>| field.as_deref().unwrap_or_default().to_string();

    match item.link_type {
        Some(LinkType::Anchor) => format!("#{}", text(&item.anchor)),
        Some(LinkType::Internal) => reference_url(item.internal_link, |id| urls.page_url(id)),
        Some(LinkType::External) => text(&item.external_link),
        Some(LinkType::Email) => format!("mailto:{}", text(&item.email)),
        Some(LinkType::Telephone) => format!("tel:+{}", text(&item.telephone)),
        Some(LinkType::File) => reference_url(item.file, |id| urls.asset_url(id)),
        Some(LinkType::Image) => reference_url(item.image, |id| urls.asset_url(id)),
        None => String::new(),
    }
}

fn reference_url(id: Option<Uuid>, lookup: impl Fn(&Uuid) -> Option<String>) -> String {
    let Some(id) = id else {
        return String::new();
    };
    lookup(&id).unwrap_or_else(|| {
        tracing::trace!(%id, "link references an entity without a url");
        String::new()
    })
}

/// Link type tags and their menu labels, before hooks run
pub fn default_link_types() -> Choices {
    LinkType::ALL
        .into_iter()
        .map(|t| (t.as_str(), t.label()))
        .collect()
}

/// Values for the HTML target attribute and their labels
pub fn targets() -> Choices {
    [("_blank", "New tab")].into_iter().collect()
}

/// Link resolution plus its extension points.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    link_hooks: Hooks<LinkItem, String>,
    link_type_hooks: Hooks<(), Choices>,
}

impl LinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that may rewrite every resolved link
    pub fn on_link<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&LinkItem, &mut String) + Send + Sync + 'static,
    {
        self.link_hooks.register(callback);
        self
    }

    /// Register a callback that may rewrite the link type menu. The menu
    /// has no context beyond itself.
    pub fn on_link_types<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Choices) + Send + Sync + 'static,
    {
        self.link_type_hooks
            .register(move |_: &(), types: &mut Choices| callback(types));
        self
    }

    /// Resolve a link item, then run the link hooks over the result
    pub fn resolve(&self, item: &LinkItem, urls: &dyn EntityUrls) -> String {
        let mut link = resolve_link(item, urls);
        self.link_hooks.apply(item, &mut link);
        link
    }

    /// The link type menu after hooks
    pub fn link_types(&self) -> Choices {
        let mut items = default_link_types();
        self.link_type_hooks.apply(&(), &mut items);
        items
    }

    pub fn targets(&self) -> Choices {
        targets()
    }

    /// Summary columns (title and resolved link) for listing
    pub fn summarize(&self, item: &LinkItem, urls: &dyn EntityUrls) -> LinkSummary {
        LinkSummary {
            id: item.id,
            title: item.title.clone(),
            link: self.resolve(item, urls),
        }
    }
}

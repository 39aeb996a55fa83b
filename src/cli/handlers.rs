use std::env;
use std::io;
use std::path::PathBuf;

use uuid::Uuid;

use super::commands::LinkFieldArgs;
use crate::config::LinkItemConfig;
use crate::entity::{
    Asset, AssetKind, LinkItem, LinkType, Page, PLURAL_NAME, SINGULAR_NAME, SUMMARY_FIELDS,
};
use crate::error::{LinkItemError, Result};
use crate::resolver::LinkResolver;
use crate::storage::{LinkItemUpdate, LinkStore, SqliteStore};
use crate::validation::RequiredFields;

/// Find the project root by looking for .linkitem/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(".linkitem").exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

/// Open the project store and a resolver with the project's configured hooks
fn open_project() -> Result<(SqliteStore, LinkResolver)> {
    let root = find_project_root();
    let store = SqliteStore::open(&root)?;
    let config = match store.project_dir() {
        Some(dir) => LinkItemConfig::load(dir)?,
        None => LinkItemConfig::default(),
    };
    Ok((store, config.resolver()))
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Resolve a page or asset reference given as a full UUID or unique prefix
fn resolve_reference(kind: &str, raw: &str, candidates: Vec<Uuid>) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        if candidates.contains(&id) {
            return Ok(id);
        }
        return Err(LinkItemError::EntityNotFound(format!("{} {}", kind, raw)));
    }

    let prefix = raw.to_lowercase();
    let matches: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(LinkItemError::EntityNotFound(format!("{} {}", kind, raw))),
        _ => Err(LinkItemError::AmbiguousId(raw.to_string())),
    }
}

fn page_reference(store: &SqliteStore, raw: &str) -> Result<Uuid> {
    let ids = store.list_pages()?.into_iter().map(|p| p.id).collect();
    resolve_reference("page", raw, ids)
}

/// Only assets of `kind` are candidates, so `--image` never picks up a file
fn asset_reference(store: &SqliteStore, raw: &str, kind: AssetKind) -> Result<Uuid> {
    let ids = store
        .list_assets()?
        .into_iter()
        .filter(|a| a.kind == kind)
        .map(|a| a.id)
        .collect();
    resolve_reference(&kind.to_string(), raw, ids)
}

/// Turn the shared field flags into an update payload
fn fields_to_update(store: &SqliteStore, fields: LinkFieldArgs) -> Result<LinkItemUpdate> {
    let link_type = fields
        .link_type
        .map(|raw| {
            raw.parse::<LinkType>()
                .map_err(|_| LinkItemError::InvalidLinkType(raw))
        })
        .transpose()?;
    let internal_link = fields
        .page
        .map(|raw| page_reference(store, &raw))
        .transpose()?;
    let file = fields
        .file
        .map(|raw| asset_reference(store, &raw, AssetKind::File))
        .transpose()?;
    let image = fields
        .image
        .map(|raw| asset_reference(store, &raw, AssetKind::Image))
        .transpose()?;

    Ok(LinkItemUpdate {
        title: None,
        link_type,
        target: fields.target.map(Some),
        anchor: fields.anchor.map(Some),
        internal_link: internal_link.map(Some),
        external_link: fields.url.map(Some),
        email: fields.email.map(Some),
        telephone: fields.phone.map(Some),
        file: file.map(Some),
        image: image.map(Some),
        sort_order: fields.sort,
    })
}

fn print_item(item: &LinkItem, link: &str) {
    println!("{} ({})", item.title, item.id);
    let link_type = item.link_type.map(|t| t.as_str()).unwrap_or("(unset)");
    println!("  type:   {}", link_type);
    println!("  link:   {}", link);
    if let Some(ref target) = item.target {
        println!("  target: {}", target);
    }
    println!("  sort:   {}", item.sort_order);
    println!("  updated: {}", item.updated_at.format("%Y-%m-%d %H:%M:%S"));
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let _store = SqliteStore::init(&root)?;

    println!("Initialized linkitem project in {}", root.display());
    Ok(())
}

pub fn handle_page_add(title: String, url: String, json: bool) -> Result<()> {
    let (store, _) = open_project()?;

    let page = Page::new(title, url);
    store.add_page(&page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        println!("Created page ({}) - {} {}", short_id(&page.id), page.title, page.url);
    }
    Ok(())
}

pub fn handle_page_list(json: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let pages = store.list_pages()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
    } else if pages.is_empty() {
        println!("No pages found.");
    } else {
        println!("Pages:\n");
        for p in pages {
            println!("  ({}) {}  {}", short_id(&p.id), p.title, p.url);
        }
    }
    Ok(())
}

pub fn handle_asset_add(kind: String, filename: String, url: String, json: bool) -> Result<()> {
    let (store, _) = open_project()?;

    let kind: AssetKind = kind
        .parse()
        .map_err(|_| LinkItemError::InvalidAssetKind(kind))?;
    let asset = Asset::new(kind, filename, url);
    store.add_asset(&asset)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&asset)?);
    } else {
        println!(
            "Created {} ({}) - {}",
            asset.kind,
            short_id(&asset.id),
            asset.filename
        );
    }
    Ok(())
}

pub fn handle_asset_list(json: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let assets = store.list_assets()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assets)?);
    } else if assets.is_empty() {
        println!("No assets found.");
    } else {
        println!("Assets:\n");
        for a in assets {
            let state = if a.published { "published" } else { "draft" };
            println!(
                "  ({}) [{}|{}] {}  {}",
                short_id(&a.id),
                a.kind,
                state,
                a.filename,
                a.url
            );
        }
    }
    Ok(())
}

pub fn handle_add(title: String, fields: LinkFieldArgs, json: bool) -> Result<()> {
    let (store, resolver) = open_project()?;

    let update = fields_to_update(&store, fields)?;

    // Start untyped so the form check sees a missing --type
    let mut item = LinkItem::new(title, LinkType::Anchor);
    item.link_type = None;
    item.sort_order = store.list_items()?.len() as i64 + 1;
    update.apply_to(&mut item);

    RequiredFields::link_item().validate(&item)?;

    store.save_item(&item)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!(
            "Created {} ({}) - {} -> {}",
            SINGULAR_NAME.to_lowercase(),
            short_id(&item.id),
            item.title,
            resolver.resolve(&item, &store)
        );
    }
    Ok(())
}

pub fn handle_list(json: bool) -> Result<()> {
    let (store, resolver) = open_project()?;
    let summaries: Vec<_> = store
        .list_items()?
        .iter()
        .map(|item| resolver.summarize(item, &store))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No {} found.", PLURAL_NAME.to_lowercase());
    } else {
        println!("{}:\n", PLURAL_NAME);
        let [(_, title_label), (_, link_label)] = SUMMARY_FIELDS;
        println!("  {:<10} {:<30} {}", "ID", title_label, link_label);
        for s in summaries {
            println!("  {:<10} {:<30} {}", short_id(&s.id), s.title, s.link);
        }
    }
    Ok(())
}

pub fn handle_get(id: String, json: bool) -> Result<()> {
    let (store, resolver) = open_project()?;
    let item = store.find_item(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_item(&item, &resolver.resolve(&item, &store));
    }
    Ok(())
}

pub fn handle_resolve(id: String, live: bool) -> Result<()> {
    let (store, resolver) = open_project()?;
    let draft = store.find_item(&id)?;

    let item = if live {
        store
            .get_live_item(&draft.id)?
            .ok_or_else(|| LinkItemError::EntityNotFound(format!("published {}", id)))?
    } else {
        draft
    };

    println!("{}", resolver.resolve(&item, &store));
    Ok(())
}

pub fn handle_update(
    id: String,
    title: Option<String>,
    fields: LinkFieldArgs,
    no_target: bool,
    json: bool,
) -> Result<()> {
    let (store, resolver) = open_project()?;
    let existing = store.find_item(&id)?;

    let mut update = fields_to_update(&store, fields)?;
    update.title = title;
    if no_target {
        update.target = Some(None);
    }

    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    // Check the form before anything is written
    let mut preview = existing.clone();
    if let Some(ref title) = update.title {
        preview.title = title.clone();
    }
    RequiredFields::link_item().validate(&preview)?;

    let item = store.update_item(&existing.id, update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!(
            "Updated ({}) - {} -> {}",
            short_id(&item.id),
            item.title,
            resolver.resolve(&item, &store)
        );
    }
    Ok(())
}

pub fn handle_delete(id: String, force: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let item = store.find_item(&id)?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!(
            "Delete {} ({}) - {} and the assets it owns? [y/N] ",
            SINGULAR_NAME.to_lowercase(),
            short_id(&item.id),
            item.title
        );

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(LinkItemError::ConfirmationRequired);
        }
    }

    store.delete_item(&item.id)?;
    println!("Deleted ({}) - {}", short_id(&item.id), item.title);
    Ok(())
}

pub fn handle_duplicate(id: String, json: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let item = store.find_item(&id)?;
    let copy = store.duplicate_item(&item.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&copy)?);
    } else {
        println!(
            "Duplicated ({}) as ({}) - {}",
            short_id(&item.id),
            short_id(&copy.id),
            copy.title
        );
    }
    Ok(())
}

pub fn handle_publish(id: String) -> Result<()> {
    let (store, _) = open_project()?;
    let item = store.find_item(&id)?;
    let version = store.publish_item(&item.id)?;

    println!(
        "Published ({}) - {} at version {}",
        short_id(&item.id),
        item.title,
        version
    );
    Ok(())
}

pub fn handle_versions(id: String, json: bool) -> Result<()> {
    let (store, resolver) = open_project()?;
    let item = store.find_item(&id)?;
    let versions = store.versions(&item.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
    } else {
        println!("Versions of ({}) - {}:\n", short_id(&item.id), item.title);
        for v in versions {
            let marker = if v.published { " [published]" } else { "" };
            println!(
                "  v{} {}{}  {}",
                v.version,
                v.created_at.format("%Y-%m-%d %H:%M:%S"),
                marker,
                resolver.resolve(&v.item, &store)
            );
        }
    }
    Ok(())
}

pub fn handle_rollback(id: String, version: u32) -> Result<()> {
    let (store, resolver) = open_project()?;
    let item = store.find_item(&id)?;
    let restored = store.rollback_item(&item.id, version)?;

    println!(
        "Rolled back ({}) to version {} -> {}",
        short_id(&restored.id),
        version,
        resolver.resolve(&restored, &store)
    );
    Ok(())
}

pub fn handle_types(json: bool) -> Result<()> {
    let resolver = match open_project() {
        Ok((_, resolver)) => resolver,
        Err(LinkItemError::NotInitialized) => LinkResolver::new(),
        Err(e) => return Err(e),
    };
    let types = resolver.link_types();

    if json {
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        for (tag, label) in types.iter() {
            println!("  {:<10} {}", tag, label);
        }
    }
    Ok(())
}

pub fn handle_targets(json: bool) -> Result<()> {
    let targets = LinkResolver::new().targets();

    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        for (value, label) in targets.iter() {
            println!("  {:<10} {}", value, label);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference_by_prefix() {
        let a = Uuid::parse_str("11111111-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("22222222-0000-4000-8000-000000000000").unwrap();

        assert_eq!(resolve_reference("page", "1111", vec![a, b]).unwrap(), a);
        assert_eq!(
            resolve_reference("page", &b.to_string(), vec![a, b]).unwrap(),
            b
        );
        assert!(matches!(
            resolve_reference("page", "3333", vec![a, b]),
            Err(LinkItemError::EntityNotFound(_))
        ));
        assert!(matches!(
            resolve_reference("page", "", vec![a, b]),
            Err(LinkItemError::AmbiguousId(_))
        ));
    }

    #[test]
    fn test_fields_to_update_rejects_unknown_type() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = LinkFieldArgs {
            link_type: Some("fax".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fields_to_update(&store, fields),
            Err(LinkItemError::InvalidLinkType(_))
        ));
    }

    #[test]
    fn test_fields_to_update_resolves_page_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        let page = Page::new("About".to_string(), "/about/".to_string());
        store.add_page(&page).unwrap();

        let fields = LinkFieldArgs {
            link_type: Some("internal".to_string()),
            page: Some(short_id(&page.id)),
            ..Default::default()
        };
        let update = fields_to_update(&store, fields).unwrap();
        assert_eq!(update.link_type, Some(LinkType::Internal));
        assert_eq!(update.internal_link, Some(Some(page.id)));
    }

    #[test]
    fn test_asset_flags_only_match_their_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let file = Asset::new(
            AssetKind::File,
            "guide.pdf".to_string(),
            "/assets/guide.pdf".to_string(),
        );
        let image = Asset::new(
            AssetKind::Image,
            "logo.png".to_string(),
            "/assets/logo.png".to_string(),
        );
        store.add_asset(&file).unwrap();
        store.add_asset(&image).unwrap();

        let fields = LinkFieldArgs {
            link_type: Some("image".to_string()),
            image: Some(file.id.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fields_to_update(&store, fields),
            Err(LinkItemError::EntityNotFound(_))
        ));

        let fields = LinkFieldArgs {
            file: Some(short_id(&image.id)),
            ..Default::default()
        };
        assert!(matches!(
            fields_to_update(&store, fields),
            Err(LinkItemError::EntityNotFound(_))
        ));

        let fields = LinkFieldArgs {
            link_type: Some("image".to_string()),
            image: Some(short_id(&image.id)),
            ..Default::default()
        };
        let update = fields_to_update(&store, fields).unwrap();
        assert_eq!(update.image, Some(Some(image.id)));
    }

    #[test]
    fn test_owned_asset_rejected_for_second_item() {
        let store = SqliteStore::open_in_memory().unwrap();
        let file = Asset::new(
            AssetKind::File,
            "guide.pdf".to_string(),
            "/assets/guide.pdf".to_string(),
        );
        store.add_asset(&file).unwrap();

        let mut first = LinkItem::new("Guide".to_string(), LinkType::File);
        first.file = Some(file.id);
        store.save_item(&first).unwrap();

        let fields = LinkFieldArgs {
            link_type: Some("file".to_string()),
            file: Some(short_id(&file.id)),
            ..Default::default()
        };
        let mut second = LinkItem::new("Copy".to_string(), LinkType::File);
        fields_to_update(&store, fields).unwrap().apply_to(&mut second);
        assert!(matches!(
            store.save_item(&second),
            Err(LinkItemError::AssetOwned { .. })
        ));
    }
}

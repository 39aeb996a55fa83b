use clap::Parser;
use linkitem::cli::{
    handle_add, handle_asset_add, handle_asset_list, handle_delete, handle_duplicate, handle_get,
    handle_init, handle_list, handle_page_add, handle_page_list, handle_publish, handle_resolve,
    handle_rollback, handle_targets, handle_types, handle_update, handle_versions, AssetAction,
    Cli, Commands, PageAction,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Page(page) => match page.action {
            PageAction::Add { title, url, json } => handle_page_add(title, url, json),
            PageAction::List { json } => handle_page_list(json),
        },
        Commands::Asset(asset) => match asset.action {
            AssetAction::Add {
                kind,
                filename,
                url,
                json,
            } => handle_asset_add(kind, filename, url, json),
            AssetAction::List { json } => handle_asset_list(json),
        },
        Commands::Add {
            title,
            fields,
            json,
        } => handle_add(title, fields, json),
        Commands::List { json } => handle_list(json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Resolve { id, live } => handle_resolve(id, live),
        Commands::Update {
            id,
            title,
            fields,
            no_target,
            json,
        } => handle_update(id, title, fields, no_target, json),
        Commands::Delete { id, force } => handle_delete(id, force),
        Commands::Duplicate { id, json } => handle_duplicate(id, json),
        Commands::Publish { id } => handle_publish(id),
        Commands::Versions { id, json } => handle_versions(id, json),
        Commands::Rollback { id, to_version } => handle_rollback(id, to_version),
        Commands::Types { json } => handle_types(json),
        Commands::Targets { json } => handle_targets(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

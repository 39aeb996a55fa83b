mod commands;
mod handlers;

pub use commands::{
    AssetAction, AssetCommand, Cli, Commands, LinkFieldArgs, PageAction, PageCommand,
};
pub use handlers::{
    handle_add, handle_asset_add, handle_asset_list, handle_delete, handle_duplicate, handle_get,
    handle_init, handle_list, handle_page_add, handle_page_list, handle_publish, handle_resolve,
    handle_rollback, handle_targets, handle_types, handle_update, handle_versions,
};

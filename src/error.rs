use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkItemError {
    #[error("Not in a linkitem project. Run 'linkitem init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .linkitem/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Ambiguous id prefix '{0}' matches more than one link item")]
    AmbiguousId(String),

    #[error("Invalid link type: {0}")]
    InvalidLinkType(String),

    #[error("Invalid asset kind: {0}")]
    InvalidAssetKind(String),

    #[error("Asset {asset} is already owned by link item {owner}")]
    AssetOwned { asset: String, owner: String },

    #[error("Version {version} not found for link item {id}")]
    VersionNotFound { id: String, version: u32 },

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("{field} is required: {message}")]
    Validation { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, LinkItemError>;

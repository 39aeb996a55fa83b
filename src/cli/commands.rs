use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "linkitem")]
#[command(version, about = "Typed CMS links: resolve, version, and publish link items")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new linkitem project in the current directory
    Init,

    /// Manage pages that internal links point at
    Page(PageCommand),

    /// Manage files and images owned by link items
    Asset(AssetCommand),

    /// Add a new link item
    Add {
        /// Link title
        title: String,

        #[command(flatten)]
        fields: LinkFieldArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List link items in sort order, with their resolved links
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get a single link item by ID
    Get {
        /// Link item ID (full UUID or unique prefix like "a1b2c")
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved link of a link item
    Resolve {
        /// Link item ID
        id: String,

        /// Resolve the published version instead of the draft
        #[arg(long)]
        live: bool,
    },

    /// Update a link item's draft
    Update {
        /// Link item ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: LinkFieldArgs,

        /// Remove the target attribute
        #[arg(long, conflicts_with = "target")]
        no_target: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a link item and the file and image it owns
    Delete {
        /// Link item ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Copy a link item, including the file and image it owns
    Duplicate {
        /// Link item ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish a link item's draft and the assets it owns
    Publish {
        /// Link item ID
        id: String,
    },

    /// Show the recorded versions of a link item
    Versions {
        /// Link item ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore a link item's draft from an earlier version
    Rollback {
        /// Link item ID
        id: String,

        /// Version number to restore
        #[arg(value_name = "VERSION")]
        to_version: u32,
    },

    /// List the available link types
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available link targets
    Targets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Type-specific fields shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct LinkFieldArgs {
    /// Link type (anchor, internal, external, email, telephone, file, image)
    #[arg(long = "type", short = 't')]
    pub link_type: Option<String>,

    /// Target attribute, e.g. "_blank"
    #[arg(long)]
    pub target: Option<String>,

    /// Fragment for anchor links
    #[arg(long)]
    pub anchor: Option<String>,

    /// Page ID for internal links
    #[arg(long)]
    pub page: Option<String>,

    /// URL for external links
    #[arg(long)]
    pub url: Option<String>,

    /// Address for email links
    #[arg(long)]
    pub email: Option<String>,

    /// Number for telephone links
    #[arg(long)]
    pub phone: Option<String>,

    /// File asset ID for file links
    #[arg(long)]
    pub file: Option<String>,

    /// Image asset ID for image links
    #[arg(long)]
    pub image: Option<String>,

    /// Position among sibling links
    #[arg(long)]
    pub sort: Option<i64>,
}

#[derive(Args, Debug)]
pub struct PageCommand {
    #[command(subcommand)]
    pub action: PageAction,
}

#[derive(Subcommand, Debug)]
pub enum PageAction {
    /// Add a page
    Add {
        /// Page title
        title: String,

        /// Page URL, e.g. "/about/"
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List pages
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct AssetCommand {
    #[command(subcommand)]
    pub action: AssetAction,
}

#[derive(Subcommand, Debug)]
pub enum AssetAction {
    /// Add a file or image
    Add {
        /// Asset kind (file, image)
        kind: String,

        /// File name
        filename: String,

        /// Public URL of the asset
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List assets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

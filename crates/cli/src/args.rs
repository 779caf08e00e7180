//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not run searches (see `session` module).
//! - Does not merge configuration layers (see `dashbrowse_config::ConfigLoader`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dashbrowse_state::{Layout, NavigationAction, QueryPatch};

#[derive(Parser)]
#[command(name = "dashbrowse")]
#[command(about = "dashbrowse - Search and browse a dashboard catalog from the command line", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  dashbrowse --catalog catalog.json search -q cpu\n  dashbrowse --catalog catalog.json search --tag prod --layout grid --keys down,right,enter\n  dashbrowse --catalog catalog.json --route 'query=cpu&sort=alpha-desc' search\n  dashbrowse --catalog catalog.json tags --starred\n"
)]
pub struct Cli {
    /// Catalog file to search (JSON: {\"rows\": [...], \"starred\": [...]})
    #[arg(short, long, global = true, env = "DASHBROWSE_CATALOG", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Initial route query string (e.g., 'query=cpu&tag=prod&layout=grid')
    #[arg(short, long, global = true, value_name = "QUERY")]
    pub route: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Path to a custom configuration file (overrides default location).
    ///
    /// Can also be set via DASHBROWSE_CONFIG_PATH environment variable.
    #[arg(long, global = true, env = "DASHBROWSE_CONFIG_PATH", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Path to the preference file that remembers layout and sort.
    #[arg(long, global = true, value_name = "FILE")]
    pub preferences_path: Option<PathBuf>,

    /// Ignore stored preferences and do not write any.
    #[arg(long, global = true)]
    pub fresh: bool,

    /// Application base path stripped from navigation targets (e.g., /grafana)
    #[arg(long, global = true, value_name = "PATH")]
    pub base_path: Option<String>,

    /// Print collected search metrics in Prometheus text format to stderr.
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a search and print the results
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Navigation keys to replay over the results (e.g., down,down,enter)
        #[arg(short, long, value_delimiter = ',', value_name = "KEYS")]
        keys: Vec<NavigationAction>,

        /// Select every loaded row and report the selection
        #[arg(long)]
        select_all: bool,

        /// Select a folder together with its loaded descendants
        #[arg(long, value_name = "UID")]
        select_folder: Option<String>,
    },

    /// List tag facets for the current filters
    Tags {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List the sorts the catalog supports
    Sorts,
}

/// Filters shared by commands that derive a query.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Free text to search for
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Only rows carrying this tag (repeatable)
    #[arg(short, long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only rows using this datasource uid
    #[arg(long, value_name = "UID")]
    pub datasource: Option<String>,

    /// Only panels of this type
    #[arg(long, value_name = "TYPE")]
    pub panel_type: Option<String>,

    /// Only starred rows
    #[arg(long)]
    pub starred: bool,

    /// Sort value (see `dashbrowse sorts`)
    #[arg(short, long, value_name = "SORT")]
    pub sort: Option<String>,

    /// Result layout (folders, list, grid)
    #[arg(short, long, value_name = "LAYOUT")]
    pub layout: Option<Layout>,

    /// Restrict results to a folder subtree
    #[arg(short, long, value_name = "UID")]
    pub folder: Option<String>,

    /// Exclude panels from term searches
    #[arg(long)]
    pub no_sub_items: bool,
}

impl FilterArgs {
    /// Whether any filter was given on the command line.
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.tags.is_empty()
            && self.datasource.is_none()
            && self.panel_type.is_none()
            && !self.starred
            && self.sort.is_none()
            && self.layout.is_none()
            && self.folder.is_none()
            && !self.no_sub_items
    }

    /// Fields that go through a plain merge.
    ///
    /// Sort, layout and sub-item inclusion are left out; they are applied
    /// through their mutators so the preference store sees them.
    pub fn patch(&self) -> QueryPatch {
        QueryPatch {
            term: self.query.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            datasource: self.datasource.clone().map(Some),
            panel_type: self.panel_type.clone().map(Some),
            starred: self.starred.then_some(true),
            folder_scope: self.folder.clone().map(Some),
            ..QueryPatch::default()
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

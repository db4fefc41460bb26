use clap::{ArgAction, Parser, Subcommand};
use doc_index::SearchMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Documentation root to index (overrides DOCS_ROOT and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub docs_root: Option<PathBuf>,

    /// Where the index is stored (overrides INDEX_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub index_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the documentation index
    Search {
        /// Query text; supports "phrases", +required, -excluded, AND/OR/NOT and field:term
        query: String,

        /// How much of each matching section to show: snippet, full or section
        #[arg(short, long, default_value_t = SearchMode::Snippet)]
        mode: SearchMode,

        /// Maximum number of results (1-100)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Wrap matched terms in snippets with **
        #[arg(long)]
        highlight: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the index from scratch
    Build {
        /// Overwrite an existing index without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Rebuild the index to pick up changed documentation
    Update,
    /// Show information about the current index
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

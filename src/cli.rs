//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio content engine CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Content directory path (overrides `[content].dir`)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load the content directory and print aggregate statistics
    Stats,

    /// List published documents, newest first
    List {
        /// Only documents with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only documents in this category
        #[arg(long)]
        category: Option<String>,

        /// List drafts instead of published documents
        #[arg(short, long)]
        drafts: bool,

        /// Maximum number of documents (0 = all)
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: usize,
    },

    /// Show one document
    Show {
        slug: String,

        /// Print rendered HTML instead of the excerpt
        #[arg(long)]
        html: bool,
    },

    /// Ranked full-text search
    Search {
        query: String,

        /// Maximum number of results (default: `[search].default_limit`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Match titles only
        #[arg(long)]
        title: bool,

        /// Keep documents with any of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Print search suggestions for the query as a prefix instead
        #[arg(long)]
        suggest: bool,
    },

    /// Publish a draft by clearing its `draft` flag on disk
    Publish { slug: String },

    /// Unpublish a document by setting its `draft` flag on disk
    Unpublish { slug: String },

    /// Keep the store loaded and reload on every content change
    Watch,
}

impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch)
    }
}

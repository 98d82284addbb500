use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::rule::Platform;
use crate::search::SortMode;

#[derive(Parser, Debug)]
#[command(name = "ghosttrace")]
#[command(version, about = "A local-first library for authoring and searching detection rules")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the rule store file
    #[arg(long, global = true, default_value = "detection_rules.json", value_name = "FILE")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new detection rule
    Add {
        /// Rule title
        title: String,

        /// Rule description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Target platform (sentinel, splunk, crowdstrike, chronicle, yara, sigma)
        #[arg(long, short = 'p')]
        platform: Option<Platform>,

        /// Detection query text
        #[arg(long, short = 'q', conflicts_with = "stdin")]
        query: Option<String>,

        /// Read the query text from stdin (preserves newlines)
        #[arg(long)]
        stdin: bool,

        /// Free-text tags
        #[arg(long, short = 't')]
        tags: Option<String>,

        /// Reference links or notes
        #[arg(long, short = 'r')]
        references: Option<String>,

        /// Output the saved rule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an existing rule (fields not given are kept)
    Edit {
        /// Rule id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        #[arg(long, short = 'p')]
        platform: Option<Platform>,

        #[arg(long, short = 'q', conflicts_with = "stdin")]
        query: Option<String>,

        /// Read the query text from stdin (preserves newlines)
        #[arg(long)]
        stdin: bool,

        #[arg(long, short = 't')]
        tags: Option<String>,

        #[arg(long, short = 'r')]
        references: Option<String>,

        /// Output the saved rule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single rule by id or unique id prefix
    Get {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every rule in the store
    List {
        /// Sort order (newest, oldest, title-asc, title-desc)
        #[arg(long, short = 's', default_value_t = SortMode::default())]
        sort: SortMode,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search rules by case-insensitive substring
    Search {
        /// Search term; matches anywhere in a rule's serialized text
        term: String,

        /// Sort order (newest, oldest, title-asc, title-desc)
        #[arg(long, short = 's', default_value_t = SortMode::default())]
        sort: SortMode,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export rules as pretty-printed JSON blocks to a text file
    Export {
        /// Destination file
        path: PathBuf,

        /// Export only rules matching this search term (default: the whole store)
        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Sort order for the exported list
        #[arg(long, short = 's', default_value_t = SortMode::default())]
        sort: SortMode,
    },

    /// Import rules from a JSON array file
    Import {
        /// Source file
        path: PathBuf,

        /// Overwrite every conflicting rule without prompting
        #[arg(long, conflicts_with = "skip_all")]
        overwrite_all: bool,

        /// Keep every conflicting rule without prompting
        #[arg(long)]
        skip_all: bool,
    },

    /// Write a timestamped backup of the whole store
    Backup,

    /// Replace the store with the contents of a backup file
    Restore {
        /// Backup file to restore from
        path: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

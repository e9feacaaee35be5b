//! CLI definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::session::FormOverrides;
use crate::transfer::MergeStrategy;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// ratedesk - rate text records one at a time, keep progress, export ratings
#[derive(Parser, Debug)]
#[command(name = "ratedesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.ratedesk/data/ratedesk.db)
    #[arg(long, global = true, env = "RATEDESK_DB")]
    pub db: Option<PathBuf>,

    /// IANA timezone used to stamp ratings (default: America/New_York)
    #[arg(long, global = true, env = "RATEDESK_TZ")]
    pub timezone: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the local rating store
    Init {
        /// Recreate the store, dropping everything in it
        #[arg(long)]
        force: bool,
    },

    /// Load a dataset (replaces the working set, keeps ratings)
    Load {
        /// JSON file holding an array of records
        #[arg(required_unless_present = "sample", conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Fetch the sample dataset instead of reading a file
        #[arg(long)]
        sample: bool,

        /// Sample URL override (default: RATEDESK_SAMPLE_URL or built-in)
        #[arg(long, requires = "sample", conflicts_with = "file")]
        url: Option<String>,
    },

    /// Show the current item and its saved rating
    Show,

    /// Edit the current item's rating (autosaves)
    Rate {
        #[command(flatten)]
        form: FormArgs,

        /// Reject the save unless category, valence and any required
        /// subcategory are set
        #[arg(long)]
        strict: bool,
    },

    /// Save the form and move to the next item
    Next {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Save the form and move to the previous item
    Prev {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Save the form and jump to a 1-based position
    Jump {
        /// Position to jump to (1 = first item)
        #[arg(allow_hyphen_values = true)]
        position: String,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Clear the current item's form and save the empty rating
    Clear,

    /// Show or set the rater id (applies to every stored rating)
    Rater {
        /// New rater id; an empty string clears it
        id: Option<String>,
    },

    /// Show completion progress
    Progress,

    /// Write all ratings to ratings_<rater>_<millis>.json
    Export {
        /// Output directory (default: current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge ratings from an export file
    Import {
        /// Export file to read
        file: PathBuf,

        /// Which version wins when a rating exists on both sides
        #[arg(long, value_enum, default_value_t)]
        strategy: MergeStrategy,
    },

    /// List dataset items with their rating state
    List {
        /// Only items without a complete rating
        #[arg(long)]
        pending: bool,
    },

    /// Show recent changes
    History {
        /// Maximum events to show
        #[arg(long, short, default_value = "20")]
        limit: u32,
    },

    /// Delete every stored rating and the rater id
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show dataset, position, rater and progress
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Rating form edits shared by `rate`, `next`, `prev` and `jump`.
///
/// Unset flags keep the value already saved for the item.
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// Category code (1-4), or `none` to clear
    #[arg(long)]
    pub category: Option<String>,

    /// Valence (pos, neg, neu, mixed), or `none` to clear
    #[arg(long)]
    pub valence: Option<String>,

    /// Subcategory (used by categories 2 and 3), or `none` to clear
    #[arg(long)]
    pub subcategory: Option<String>,

    /// Flag the item for review
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub flagged: Option<bool>,

    /// Too short to code (nulls category, valence and subcategory)
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub too_short: Option<bool>,

    /// Promotional content
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub promotional: Option<bool>,

    /// Engagement bait
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub engagement: Option<bool>,
}

impl FormArgs {
    #[must_use]
    pub fn overrides(&self) -> FormOverrides {
        FormOverrides {
            category: self.category.clone(),
            valence: self.valence.clone(),
            subcategory: self.subcategory.clone(),
            flagged: self.flagged,
            too_short: self.too_short,
            promotional: self.promotional,
            engagement: self.engagement,
        }
    }
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

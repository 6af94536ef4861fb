use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "cafegram")]
#[command(about = "Personal café catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file (overrides CAFEGRAM_DB_PATH)
    #[arg(long, global = true, conflicts_with = "in_memory")]
    pub db: Option<PathBuf>,

    /// Use a throwaway in-memory catalog
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Absolute directory for rolling log files (overrides CAFEGRAM_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides CAFEGRAM_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every café in name order
    #[command(alias = "ls")]
    List,

    /// Add a café
    #[command(alias = "new")]
    Add {
        name: String,
        #[command(flatten)]
        fields: CafeFields,
    },

    /// Edit a café; omitted fields keep their current value
    Edit {
        id: Uuid,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: CafeFields,
        /// Drop the stored image
        #[arg(long, conflicts_with = "image")]
        clear_image: bool,
    },

    /// Remove a café
    #[command(alias = "rm")]
    Remove { id: Uuid },

    /// Check in or check out (toggles visited)
    #[command(alias = "check-in")]
    Visit { id: Uuid },

    /// Set a rating label; omit it to clear
    Rate { id: Uuid, rating: Option<String> },

    /// Case-insensitive name search; an empty query lists everything
    Search {
        #[arg(default_value = "")]
        query: String,
    },

    /// Show one café
    Show { id: Uuid },

    /// Pick a random café and print its reminder
    Recommend {
        /// Delay before the reminder fires, in seconds
        #[arg(long)]
        delay: Option<u64>,
        /// Resolve a reminder action (e.g. cafegram.makeReservation)
        #[arg(long)]
        respond: Option<String>,
    },

    /// Print the check-in share text for a café
    Share { id: Uuid },
}

#[derive(clap::Args, Debug, Default)]
pub struct CafeFields {
    /// Kind of place, e.g. "coffee shop"
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
    /// Image file stored as an opaque blob
    #[arg(long)]
    pub image: Option<PathBuf>,
}

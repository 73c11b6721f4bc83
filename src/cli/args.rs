//! CLI argument definitions using clap
//!
//! Commands:
//! - easyindex inspect <dir> [--where col=value]... [--no-objects] [--only]
//! - easyindex schema <dir>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// easyindex - inspect saved object stores
#[derive(Parser, Debug)]
#[command(name = "easyindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum log severity (trace, info, warn, error, fatal); overrides the config
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the records of a saved store
    Inspect {
        /// Saved store directory
        dir: PathBuf,

        /// Filter as `column=value`; the value is parsed as JSON, falling
        /// back to a plain string. Repeat to AND filters.
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        filters: Vec<String>,

        /// Print attributes only
        #[arg(long)]
        no_objects: bool,

        /// Fail unless exactly one object matches
        #[arg(long)]
        only: bool,
    },

    /// Print the column domains of a saved store
    Schema {
        /// Saved store directory
        dir: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

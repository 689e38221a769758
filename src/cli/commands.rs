//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Pager CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured page size
    #[arg(short = 's', long, global = true)]
    pub page_size: Option<u32>,

    /// Template variable for headers and URLs (key=value, repeatable)
    #[arg(long = "var", global = true, value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the pager configuration
    Validate,

    /// Fetch a single page
    Page {
        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Fetch pages in order until the last page
    Walk {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Navigate interactively with commands read from stdin
    ///
    /// n = next, p = previous, f = first, r = reload, g N = go to page N,
    /// s N = set page size, q = quit
    Browse,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

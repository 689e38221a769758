//! CLI module
//!
//! Command-line interface for paging through a configured source.
//!
//! # Commands
//!
//! - `validate` - Check the configuration
//! - `page` - Fetch a single page
//! - `walk` - Fetch every page in order
//! - `browse` - Navigate interactively from stdin

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

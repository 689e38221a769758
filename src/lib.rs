// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Pager
//!
//! Cursor-based pagination controller for remote record sources.
//!
//! The remote source owns the query, filtering and ordering. It hands back an
//! opaque cursor with every page; the pager stores that cursor verbatim and
//! sends it back on the next request, one fetch at a time.
//!
//! ## Features
//!
//! - **Single-flight fetching**: at most one page request outstanding
//! - **Boundary absorption**: out-of-range navigation is a silent no-op
//! - **Failure isolation**: a failed fetch keeps page metadata, drops stale rows
//! - **Atomic snapshots**: observers only ever see complete states
//! - **HTTP sources**: JSON endpoints configured from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_pager::{HttpPageSource, PageController, PagerConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = PagerConfig::from_file("pager.yaml")?;
//!     let source = HttpPageSource::<serde_json::Value>::new(config.source.clone())?;
//!     let pager = PageController::from_config(source, &config)?;
//!
//!     let first = pager.idle().await;
//!     println!("{} records", first.total_records());
//!
//!     pager.next_page().await;
//!     pager.dispose();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PageController                           │
//! │  next_page()  previous_page()  go_to_page(n)  dispose()         │
//! │  snapshot() → Arc<PagerState>    subscribe() → watch::Receiver  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ one command at a time
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │   Resolve    │            Fetch              │    Reconcile     │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ Navigation   │ PageSource::fetch_page        │ success → adopt  │
//! │ → PageRequest│ HttpPageSource (GET / POST)   │ failure → keep   │
//! │ or no-op     │ timeout, rate limit           │ metadata, clear  │
//! └──────────────┴───────────────────────────────┴──────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pager
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with rate limiting
pub mod http;

/// Navigation, reconciliation and the page controller
pub mod pagination;

/// Page sources
pub mod source;

/// Pager and source configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{PagerConfig, SourceConfig};
pub use error::{Error, Result};
pub use pagination::{
    Cursor, Navigation, PageController, PageRequest, PageResponse, PagerState, PagerStats, Phase,
    Settled, Snapshot,
};
pub use source::{HttpPageSource, PageSource};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

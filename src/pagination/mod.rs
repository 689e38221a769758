//! Pagination module
//!
//! Navigation → fetch → reconcile, one page at a time.
//!
//! # Overview
//!
//! - `resolver` - turns a [`Navigation`] into a [`PageRequest`] or absorbs it
//! - `reconciler` - folds a fetch outcome into the next [`PagerState`]
//! - [`PageController`] - owns the state and serializes fetches against a
//!   [`crate::source::PageSource`]
//!
//! Cursors are opaque: whatever the source returns is sent back unchanged.

mod controller;
mod reconciler;
mod resolver;
mod types;

pub use controller::{PageController, PagerStats, Pending, Snapshot};
pub use reconciler::{begin_fetch, reconcile};
pub use resolver::resolve;
pub use types::{Cursor, Navigation, PageRequest, PageResponse, PagerState, Phase, Settled};

//! Pagination types
//!
//! Defines the request/response contract with the page source and the
//! immutable state snapshots published by the controller.

use crate::error::{Error, Result};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Cursor
// ============================================================================

/// Server-issued pagination token.
///
/// Stored and forwarded verbatim; the pager never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from the page source
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token for sending back to the source
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Request / Response
// ============================================================================

/// A single page fetch sent to the page source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// Cursor from the last successful response (absent on first request)
    pub cursor: Option<Cursor>,
    /// 1-based page to fetch
    pub page: u32,
    /// Records per page
    pub size: u32,
}

impl PageRequest {
    /// Create a request for a page
    pub fn new(cursor: Option<Cursor>, page: u32, size: u32) -> Self {
        Self { cursor, page, size }
    }
}

/// A page returned by the page source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<R> {
    /// Cursor to send with the next request (possibly new)
    #[serde(default)]
    pub cursor: Option<Cursor>,
    /// Records on this page, in server order
    #[serde(default = "Vec::new")]
    pub records: Vec<R>,
    /// 1-based page the server says it returned
    pub current_page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of records across all pages
    pub total_records: u64,
    /// Records per page used by the server
    pub page_size: u32,
}

impl<R> PageResponse<R> {
    /// Check the structural invariants of a response.
    ///
    /// Does not check `current_page <= total_pages`; see [`Self::overshoots`].
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::malformed("pageSize must be at least 1"));
        }
        if self.total_pages == 0 {
            return Err(Error::malformed("totalPages must be at least 1"));
        }
        if self.current_page == 0 {
            return Err(Error::malformed("currentPage must be at least 1"));
        }
        if self.records.len() > self.page_size as usize {
            return Err(Error::malformed(format!(
                "{} records exceed pageSize {}",
                self.records.len(),
                self.page_size
            )));
        }

        let size = u64::from(self.page_size);
        let pages = u64::from(self.total_pages);
        let consistent = if self.total_records == 0 {
            self.total_pages == 1
        } else {
            self.total_records > (pages - 1) * size && self.total_records <= pages * size
        };
        if !consistent {
            return Err(Error::malformed(format!(
                "totalRecords {} inconsistent with totalPages {} at pageSize {}",
                self.total_records, self.total_pages, self.page_size
            )));
        }

        Ok(())
    }

    /// Server reported a page past its own last page
    pub fn overshoots(&self) -> bool {
        self.current_page > self.total_pages
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// A navigation intent from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Jump to page 1
    First,
    /// Move one page forward
    Next,
    /// Move one page back
    Previous,
    /// Jump to an explicit page
    GoTo(u32),
    /// Re-fetch the current page
    Reload,
    /// Change the page size and restart at page 1
    Resize(u32),
}

/// Lifecycle phase of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Last fetch succeeded (or nothing fetched yet)
    #[default]
    Idle,
    /// A fetch is outstanding
    Fetching,
    /// Last fetch failed; `last_error` is set
    Error,
}

// ============================================================================
// State
// ============================================================================

/// Immutable snapshot of the controller state.
///
/// Snapshots are replaced wholesale; a new one is built for every
/// transition and never mutated after publication.
///
/// The serialized form is the observer view: the cursor is omitted and the
/// page boundary flags are included.
#[derive(Debug, Clone, PartialEq)]
pub struct PagerState<R> {
    pub(crate) cursor: Option<Cursor>,
    pub(crate) current_page: u32,
    pub(crate) total_pages: u32,
    pub(crate) total_records: u64,
    pub(crate) page_size: u32,
    pub(crate) records: Vec<R>,
    pub(crate) last_error: Option<String>,
    pub(crate) phase: Phase,
}

impl<R> PagerState<R> {
    /// Initial state before the first page has loaded
    pub fn new(page_size: u32) -> Self {
        Self {
            cursor: None,
            current_page: 1,
            total_pages: 1,
            total_records: 0,
            page_size,
            records: Vec::new(),
            last_error: None,
            phase: Phase::Idle,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.total_pages
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == Phase::Fetching
    }
}

impl<R: Serialize> Serialize for PagerState<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PagerState", 9)?;
        state.serialize_field("currentPage", &self.current_page)?;
        state.serialize_field("totalPages", &self.total_pages)?;
        state.serialize_field("totalRecords", &self.total_records)?;
        state.serialize_field("pageSize", &self.page_size)?;
        state.serialize_field("records", &self.records)?;
        state.serialize_field("lastError", &self.last_error)?;
        state.serialize_field("phase", &self.phase)?;
        state.serialize_field("isFirstPage", &self.is_first_page())?;
        state.serialize_field("isLastPage", &self.is_last_page())?;
        state.end()
    }
}

// ============================================================================
// Settled
// ============================================================================

/// How a navigation request ended
#[derive(Debug, Clone)]
pub enum Settled<R> {
    /// Intent was out of range; nothing was fetched or changed
    Skipped,
    /// Page fetched and committed
    Loaded(Arc<PagerState<R>>),
    /// Fetch failed; the snapshot carries `last_error`
    Failed(Arc<PagerState<R>>),
    /// Controller was disposed before the navigation settled
    Cancelled,
}

impl<R> Settled<R> {
    /// Snapshot committed by this navigation, if any
    pub fn state(&self) -> Option<&Arc<PagerState<R>>> {
        match self {
            Self::Loaded(state) | Self::Failed(state) => Some(state),
            Self::Skipped | Self::Cancelled => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

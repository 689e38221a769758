//! State reconciliation
//!
//! Pure functions from (previous snapshot, fetch outcome) to the next snapshot.
//! The controller publishes whatever these return as a single replacement.

use super::types::{PageRequest, PageResponse, PagerState, Phase};
use crate::error::{Error, Result};
use tracing::{debug, error, warn};

/// Snapshot published while a fetch is outstanding.
///
/// Keeps the visible records and clears any previous error.
pub fn begin_fetch<R: Clone>(prior: &PagerState<R>) -> PagerState<R> {
    PagerState {
        last_error: None,
        phase: Phase::Fetching,
        ..prior.clone()
    }
}

/// Fold a fetch outcome into the next snapshot
pub fn reconcile<R: Clone>(
    prior: &PagerState<R>,
    request: &PageRequest,
    outcome: Result<PageResponse<R>>,
) -> PagerState<R> {
    let response = match outcome.and_then(|response| response.validate().map(|()| response)) {
        Ok(response) => response,
        Err(err) => return failed(prior, &err),
    };

    if response.overshoots() {
        return overshot(prior, &response);
    }

    if response.current_page != request.page {
        debug!(
            "Requested page {} but source returned page {}",
            request.page, response.current_page
        );
    }

    debug!(
        "Loaded page {}/{} ({} records)",
        response.current_page,
        response.total_pages,
        response.records.len()
    );

    PagerState {
        cursor: response.cursor,
        current_page: response.current_page,
        total_pages: response.total_pages,
        total_records: response.total_records,
        page_size: response.page_size,
        records: response.records,
        last_error: None,
        phase: Phase::Idle,
    }
}

/// Keep pagination metadata, drop the stale rows, record the error
fn failed<R: Clone>(prior: &PagerState<R>, err: &Error) -> PagerState<R> {
    if err.is_malformed() {
        error!("Page source returned a malformed response: {err}");
    } else {
        warn!("Page fetch failed: {err}");
    }

    PagerState {
        cursor: prior.cursor.clone(),
        current_page: prior.current_page,
        total_pages: prior.total_pages,
        total_records: prior.total_records,
        page_size: prior.page_size,
        records: Vec::new(),
        last_error: Some(err.user_message()),
        phase: Phase::Error,
    }
}

/// The source shrank under us: adopt its totals, clamp the page, keep the cursor
fn overshot<R: Clone>(prior: &PagerState<R>, response: &PageResponse<R>) -> PagerState<R> {
    let err = Error::malformed(format!(
        "currentPage {} is past totalPages {}",
        response.current_page, response.total_pages
    ));
    let mut next = failed(prior, &err);
    next.total_pages = response.total_pages;
    next.total_records = response.total_records;
    next.current_page = prior.current_page.min(response.total_pages);
    next
}

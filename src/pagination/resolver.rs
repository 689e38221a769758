//! Navigation intent resolution
//!
//! Turns a [`Navigation`] into the [`PageRequest`] to send, or declines.
//! Declined intents are boundary taps and are absorbed silently.

use super::types::{Navigation, PageRequest, PagerState};

/// Resolve an intent against the current snapshot.
///
/// Returns `None` when the target lies outside `[1, total_pages]`
/// (or the requested page size is zero).
pub fn resolve<R>(navigation: Navigation, state: &PagerState<R>) -> Option<PageRequest> {
    let (page, size) = match navigation {
        Navigation::First => (1, state.page_size),
        Navigation::Next if state.current_page < state.total_pages => {
            (state.current_page + 1, state.page_size)
        }
        Navigation::Previous if state.current_page > 1 => {
            (state.current_page - 1, state.page_size)
        }
        Navigation::GoTo(page) if (1..=state.total_pages).contains(&page) => {
            (page, state.page_size)
        }
        Navigation::Reload => (state.current_page, state.page_size),
        Navigation::Resize(size) if size > 0 => (1, size),
        Navigation::Next | Navigation::Previous | Navigation::GoTo(_) | Navigation::Resize(_) => {
            return None
        }
    };

    Some(PageRequest::new(state.cursor.clone(), page, size))
}

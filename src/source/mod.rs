//! Page source module
//!
//! The remote side of pagination. A [`PageSource`] answers one
//! [`PageRequest`] with one [`PageResponse`]; it owns cursor semantics,
//! filtering and ordering. The pager only forwards what it was given.
//!
//! # Implementations
//!
//! - [`HttpPageSource`] - JSON over HTTP with configurable field mapping
//! - any `Arc<S>` where `S: PageSource`

mod http;
mod mapping;

pub use http::HttpPageSource;
pub use mapping::{extract_path, ResponseMapper};

use crate::error::Result;
use crate::pagination::{PageRequest, PageResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// A remote, opaquely-paginated record source
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type carried on each page
    type Record: Clone + Send + Sync + 'static;

    /// Fetch a single page
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<Self::Record>>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    type Record = S::Record;

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<Self::Record>> {
        (**self).fetch_page(request).await
    }
}

//! HTTP client module
//!
//! Provides the HTTP transport used by [`crate::source::HttpPageSource`].
//!
//! # Features
//!
//! - **Base URL & Default Headers**: Shared by every page request
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error Classification**: Timeouts, transport errors and non-2xx statuses

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

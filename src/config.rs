//! Configuration types for the pager
//!
//! A pager config names the page source and how to talk to it. Configs are
//! loaded from YAML or JSON:
//!
//! ```yaml
//! page_size: 20
//! fetch_timeout_secs: 15
//! source:
//!   base_url: "https://api.example.com"
//!   path: "/cases/page"
//!   method: POST
//!   headers:
//!     Authorization: "Bearer {{ env.API_TOKEN }}"
//!   rate_limit:
//!     requests_per_second: 5
//!     burst_size: 5
//!   request:
//!     cursor_param: cursorJson
//!   response:
//!     records_path: data.records
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::template::{self, TemplateContext};
use crate::types::{Method, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Pager Config
// ============================================================================

/// Complete pager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Records per page requested from the source
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on a single page fetch, in seconds
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,

    /// Page source definition
    pub source: SourceConfig,
}

fn default_page_size() -> u32 {
    20
}

impl PagerConfig {
    /// Create a config for a source with default paging settings
    pub fn new(source: SourceConfig) -> Self {
        Self {
            page_size: default_page_size(),
            fetch_timeout_secs: None,
            source,
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the per-fetch timeout
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// Per-fetch timeout, if configured
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.fetch_timeout_secs == Some(0) {
            return Err(Error::invalid_value(
                "fetch_timeout_secs",
                "must be at least 1",
            ));
        }
        self.source.validate()
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Where and how to fetch pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL for API requests
    pub base_url: String,

    /// Path of the paging endpoint, relative to `base_url`
    #[serde(default)]
    pub path: String,

    /// HTTP method
    #[serde(default)]
    pub method: Method,

    /// Static headers sent with every request (templated)
    #[serde(default)]
    pub headers: StringMap,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Request parameter names
    #[serde(default)]
    pub request: RequestFields,

    /// Response field paths
    #[serde(default)]
    pub response: ResponseFields,
}

fn default_timeout_secs() -> u64 {
    30
}

impl SourceConfig {
    /// Create a source config with default field names
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: String::new(),
            method: Method::default(),
            headers: StringMap::new(),
            timeout_secs: default_timeout_secs(),
            rate_limit: None,
            request: RequestFields::default(),
            response: ResponseFields::default(),
        }
    }

    /// Set the endpoint path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a static header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Validate the source config
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("source.base_url"));
        }
        if !template::has_template(&self.base_url) {
            url::Url::parse(&self.base_url)?;
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "source.timeout_secs",
                "must be at least 1",
            ));
        }
        if let Some(limit) = &self.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "source.rate_limit.requests_per_second",
                    "must be at least 1",
                ));
            }
        }
        self.request.validate()?;
        self.response.validate()
    }

    /// Build the HTTP client config, rendering templated values
    pub fn http_config(&self, ctx: &TemplateContext) -> Result<HttpClientConfig> {
        let mut builder = HttpClientConfig::builder()
            .base_url(template::render(&self.base_url, ctx)?)
            .timeout(Duration::from_secs(self.timeout_secs));

        for (key, value) in &self.headers {
            builder = builder.header(key, template::render(value, ctx)?);
        }

        if let Some(limit) = &self.rate_limit {
            builder = builder.rate_limit(limit.clone());
        }

        Ok(builder.build())
    }
}

// ============================================================================
// Field Mapping
// ============================================================================

/// Names of the request parameters (query keys for GET, body keys for POST)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFields {
    pub cursor_param: String,
    pub page_param: String,
    pub size_param: String,
}

impl Default for RequestFields {
    fn default() -> Self {
        Self {
            cursor_param: "cursorJson".to_string(),
            page_param: "page".to_string(),
            size_param: "size".to_string(),
        }
    }
}

impl RequestFields {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("source.request.cursor_param", &self.cursor_param),
            ("source.request.page_param", &self.page_param),
            ("source.request.size_param", &self.size_param),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Dot paths of the response fields (e.g. `data.page.total`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFields {
    pub cursor_path: String,
    pub records_path: String,
    pub current_page_path: String,
    pub total_pages_path: String,
    pub total_records_path: String,
    pub page_size_path: String,
}

impl Default for ResponseFields {
    fn default() -> Self {
        Self {
            cursor_path: "cursorJson".to_string(),
            records_path: "records".to_string(),
            current_page_path: "currentPage".to_string(),
            total_pages_path: "totalPages".to_string(),
            total_records_path: "totalRecords".to_string(),
            page_size_path: "pageSize".to_string(),
        }
    }
}

impl ResponseFields {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("source.response.cursor_path", &self.cursor_path),
            ("source.response.records_path", &self.records_path),
            ("source.response.current_page_path", &self.current_page_path),
            ("source.response.total_pages_path", &self.total_pages_path),
            ("source.response.total_records_path", &self.total_records_path),
            ("source.response.page_size_path", &self.page_size_path),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "cannot be empty"));
            }
        }
        Ok(())
    }
}

//! Error types for Solidafy Pager
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Navigation never returns these directly: the controller folds fetch
//! failures into the observable state via [`Error::user_message`].

use serde_json::Value;
use thiserror::Error;

/// Message shown when a failure carries no structured message of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "Unexpected error while loading records.";

/// The main error type for Solidafy Pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Page source failed: {}", .message.as_deref().unwrap_or("no message"))]
    Source { message: Option<String> },

    // ============================================================================
    // Contract Errors
    // ============================================================================
    #[error("Malformed page response: {message}")]
    MalformedResponse { message: String },

    #[error("Failed to extract '{path}' from response: {message}")]
    FieldExtraction { path: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a source failure, optionally carrying a human-readable message
    pub fn source_failure(message: Option<String>) -> Self {
        Self::Source { message }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a field extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the remote source broke its response contract
    /// (as opposed to a transient transport failure)
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedResponse { .. } | Error::FieldExtraction { .. } | Error::JsonParse(_)
        )
    }

    /// Human-readable message for display next to an empty page.
    ///
    /// Prefers a structured message carried by the failure itself: the message of
    /// a [`Error::Source`] failure, or a `message` field in a JSON error body
    /// (either `{"message": ..}` or `[{"message": ..}]`). Everything else maps to
    /// [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        let structured = match self {
            Error::Source { message } => message.clone(),
            Error::HttpStatus { body, .. } => message_from_body(body),
            _ => None,
        };

        structured
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
    }
}

/// Pull a `message` field out of a JSON error body
fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = match &value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    object
        .get("message")
        .and_then(Value::as_str)
        .map(String::from)
}

/// Result type alias for Solidafy Pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

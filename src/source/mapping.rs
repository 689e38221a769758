//! Response field mapping
//!
//! Maps an arbitrary JSON page body onto a [`PageResponse`] using the
//! dot paths from [`ResponseFields`].

use crate::config::ResponseFields;
use crate::error::{Error, Result};
use crate::pagination::{Cursor, PageResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Get a nested value by dot path (a leading `$.` is ignored)
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Builds typed page responses from JSON bodies
#[derive(Debug, Clone, Default)]
pub struct ResponseMapper {
    fields: ResponseFields,
}

impl ResponseMapper {
    /// Create a mapper for the given field paths
    pub fn new(fields: ResponseFields) -> Self {
        Self { fields }
    }

    /// Map a response body.
    ///
    /// A missing or null records field is an empty page. A missing or null
    /// cursor is no cursor. Every count field is required.
    pub fn map<R: DeserializeOwned>(&self, body: &Value) -> Result<PageResponse<R>> {
        let cursor = match extract_path(body, &self.fields.cursor_path) {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) => Some(Cursor::new(token.clone())),
            Some(other) => {
                return Err(Error::extraction(
                    &self.fields.cursor_path,
                    format!("expected a string cursor, got {other}"),
                ))
            }
        };

        let records = match extract_path(body, &self.fields.records_path) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    serde_json::from_value(item.clone()).map_err(|e| {
                        Error::extraction(
                            format!("{}[{i}]", self.fields.records_path),
                            e.to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<R>>>()?,
            Some(_) => {
                return Err(Error::extraction(
                    &self.fields.records_path,
                    "expected an array",
                ))
            }
        };

        Ok(PageResponse {
            cursor,
            records,
            current_page: self.count(body, &self.fields.current_page_path)?,
            total_pages: self.count(body, &self.fields.total_pages_path)?,
            total_records: self.count(body, &self.fields.total_records_path)?,
            page_size: self.count(body, &self.fields.page_size_path)?,
        })
    }

    /// Read a non-negative integer, accepting numeric strings
    fn count<T: TryFrom<u64>>(&self, body: &Value, path: &str) -> Result<T> {
        let raw = match extract_path(body, path) {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
            None => return Err(Error::extraction(path, "field is missing")),
        };

        raw.and_then(|n| T::try_from(n).ok())
            .ok_or_else(|| Error::extraction(path, "expected a non-negative integer"))
    }
}

//! HTTP/JSON page source

use super::mapping::ResponseMapper;
use super::PageSource;
use crate::config::SourceConfig;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{PageRequest, PageResponse};
use crate::template::TemplateContext;
use crate::types::Method;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use tracing::debug;

/// Page source backed by a JSON HTTP endpoint.
///
/// `GET` sources receive cursor/page/size as query parameters; `POST`
/// sources receive them as a JSON object. The cursor is sent only when the
/// pager holds one.
pub struct HttpPageSource<R> {
    client: HttpClient,
    config: SourceConfig,
    mapper: ResponseMapper,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpPageSource<R> {
    /// Create a source, rendering templated values from the environment
    pub fn new(config: SourceConfig) -> Result<Self> {
        Self::with_context(config, &TemplateContext::new())
    }

    /// Create a source, rendering templated values from `ctx`
    pub fn with_context(config: SourceConfig, ctx: &TemplateContext) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(config.http_config(ctx)?)?;
        let mapper = ResponseMapper::new(config.response.clone());

        Ok(Self {
            client,
            config,
            mapper,
            _record: PhantomData,
        })
    }

    /// Get the source configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn request_config(&self, request: &PageRequest) -> RequestConfig {
        let fields = &self.config.request;

        match self.config.method {
            Method::GET => {
                let mut req = RequestConfig::new()
                    .query(&fields.page_param, request.page.to_string())
                    .query(&fields.size_param, request.size.to_string());
                if let Some(cursor) = &request.cursor {
                    req = req.query(&fields.cursor_param, cursor.as_str());
                }
                req
            }
            Method::POST => {
                let mut body = Map::new();
                body.insert(fields.page_param.clone(), Value::from(request.page));
                body.insert(fields.size_param.clone(), Value::from(request.size));
                if let Some(cursor) = &request.cursor {
                    body.insert(
                        fields.cursor_param.clone(),
                        Value::String(cursor.as_str().to_string()),
                    );
                }
                RequestConfig::new().json(Value::Object(body))
            }
        }
    }
}

#[async_trait]
impl<R> PageSource for HttpPageSource<R>
where
    R: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<R>> {
        debug!(
            "Fetching page {} (size {}, cursor: {})",
            request.page,
            request.size,
            request.cursor.is_some()
        );

        let body: Value = self
            .client
            .request_json(
                self.config.method.into(),
                &self.config.path,
                self.request_config(request),
            )
            .await?;

        self.mapper.map(&body)
    }
}

impl<R> std::fmt::Debug for HttpPageSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("client", &self.client)
            .field("method", &self.config.method)
            .field("path", &self.config.path)
            .finish_non_exhaustive()
    }
}

//! Request execution seam
//!
//! `RequestExecutor` decouples the pagination and mutation engines from the
//! HTTP stack so tests can script responses without a server. `HttpExecutor`
//! is the production implementation over a shared `reqwest::Client`.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::{Error, Result};

/// Status and raw body of one executed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the API answered with no body at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Abstraction over HTTP request execution.
///
/// Only failures of the transport itself (connect, send, body read) are
/// errors; non-2xx statuses come back as a normal `ApiResponse` for the
/// caller to interpret.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn RequestExecutor>`).
pub trait RequestExecutor: Send + Sync {
    /// Execute one request and return the status plus raw body bytes.
    fn execute<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>>;
}

/// `RequestExecutor` backed by a shared `reqwest::Client`.
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl RequestExecutor for HttpExecutor {
    fn execute<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            let mut request = self.client.request(method.clone(), url).headers(headers);
            if let Some(body) = body {
                request = request.body(body);
            }
            let response = request
                .send()
                .await
                .map_err(|e| Error::Transport(format!("{method} {url}: {e}")))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Transport(format!("reading response body from {url}: {e}")))?;
            debug!(%method, url, status, bytes = body.len(), "request executed");
            Ok(ApiResponse { status, body })
        })
    }
}

/// Authorization plus the JSON content type both endpoint families send.
pub(crate) fn auth_headers(authorization: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(authorization)
            .map_err(|e| Error::Transport(format!("authorization header: {e}")))?,
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    Ok(headers)
}

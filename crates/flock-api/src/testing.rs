//! Scripted executor used by engine tests

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap};

use crate::error::Result;
use crate::transport::{ApiResponse, RequestExecutor};

/// `RequestExecutor` serving canned responses in order, recording what it
/// saw. Running past the end of the script panics, failing the test that
/// over-fetched.
pub(crate) struct ScriptedExecutor {
    responses: Mutex<Vec<Result<ApiResponse>>>,
    seen: Mutex<Vec<String>>,
    authorizations: Mutex<Vec<Option<String>>>,
}

impl ScriptedExecutor {
    pub(crate) fn new(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            seen: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(status: u16, body: &str) -> Result<ApiResponse> {
        Ok(ApiResponse {
            status,
            body: Bytes::copy_from_slice(body.as_bytes()),
        })
    }

    /// Requests executed so far, as "METHOD url" strings.
    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    /// Authorization header of each executed request, in order.
    pub(crate) fn authorizations(&self) -> Vec<Option<String>> {
        self.authorizations.lock().unwrap().clone()
    }
}

impl RequestExecutor for ScriptedExecutor {
    fn execute<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: HeaderMap,
        _body: Option<Bytes>,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        self.seen.lock().unwrap().push(format!("{method} {url}"));
        self.authorizations.lock().unwrap().push(
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        );
        let next = self.responses.lock().unwrap().remove(0);
        Box::pin(async move { next })
    }
}

/// JSON body for one listing page with one user per screen name.
pub(crate) fn page_body(next_cursor: i64, screen_names: &[&str]) -> String {
    let users: Vec<serde_json::Value> = screen_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serde_json::json!({
                "id": i as u64 + 1,
                "name": name,
                "screen_name": name,
                "location": null
            })
        })
        .collect();
    serde_json::json!({
        "previous_cursor": 0,
        "next_cursor": next_cursor,
        "users": users
    })
    .to_string()
}

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// Outbound response populated by the dispatch core and the view layer.
///
/// The dispatch core only sets the status on the not-found and failure paths.
/// Everything else is written by a [`View`](crate::view::View).
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Write a JSON body with the matching content type
    pub fn write_json(&mut self, body: &Value) -> anyhow::Result<()> {
        self.body = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(())
    }

    /// Discard whatever a failed handler or view wrote and replace it with a
    /// generic error document. The cause is never written into the body.
    pub fn reset_to_error(&mut self, status: StatusCode) {
        self.headers.clear();
        self.status = status;
        let message = status.canonical_reason().unwrap_or("Error");
        self.body = serde_json::json!({ "error": message }).to_string().into_bytes();
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    /// Hand the response back to an `http`-based transport
    #[must_use]
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use anyhow::Context;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;

/// Inbound request handed to the dispatch core by the transport.
///
/// The dispatch core only ever reads [`method`](Self::method) and
/// [`path`](Self::path). Headers, query string and body exist for handler code.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    request_id: RequestId,
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Build a request from a method and a request target such as `/pets?limit=10`.
    ///
    /// The query string is split off. The remaining path is kept verbatim.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Convert a transport-level `http::Request`.
    ///
    /// An `x-request-id` header carrying a valid ULID is adopted as the request id.
    #[must_use]
    pub fn from_http(request: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        let request_id = RequestId::from_header_or_new(
            parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        Self {
            request_id,
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        }
    }

    /// Parse `target` as a URI first. Useful when the transport hands over an
    /// absolute-form target (`http://host/path`).
    pub fn from_uri(method: Method, target: &str) -> anyhow::Result<Self> {
        let uri: Uri = target
            .parse()
            .with_context(|| format!("invalid request target `{target}`"))?;
        let mut request = Self::new(method, uri.path());
        request.query = uri.query().map(str::to_string);
        Ok(request)
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` when absent or not visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_slice(&self.body).context("request body is not valid JSON")
    }
}

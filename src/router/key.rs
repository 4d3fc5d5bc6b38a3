use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be mapped to.
///
/// This is a closed set: a request carrying any other method (including
/// extension methods) can never match a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl RequestMethod {
    /// All supported methods, in declaration order
    pub const ALL: [RequestMethod; 8] = [
        RequestMethod::Get,
        RequestMethod::Head,
        RequestMethod::Post,
        RequestMethod::Put,
        RequestMethod::Patch,
        RequestMethod::Delete,
        RequestMethod::Options,
        RequestMethod::Trace,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Options => "OPTIONS",
            RequestMethod::Trace => "TRACE",
        }
    }

    /// Convert an `http::Method`, returning `None` for methods outside the supported set.
    #[must_use]
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(RequestMethod::Get),
            Method::HEAD => Some(RequestMethod::Head),
            Method::POST => Some(RequestMethod::Post),
            Method::PUT => Some(RequestMethod::Put),
            Method::PATCH => Some(RequestMethod::Patch),
            Method::DELETE => Some(RequestMethod::Delete),
            Method::OPTIONS => Some(RequestMethod::Options),
            Method::TRACE => Some(RequestMethod::Trace),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_http(self) -> Method {
        match self {
            RequestMethod::Get => Method::GET,
            RequestMethod::Head => Method::HEAD,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
            RequestMethod::Patch => Method::PATCH,
            RequestMethod::Delete => Method::DELETE,
            RequestMethod::Options => Method::OPTIONS,
            RequestMethod::Trace => Method::TRACE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported method token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported request method `{0}`")]
pub struct UnsupportedMethod(pub String);

impl FromStr for RequestMethod {
    type Err = UnsupportedMethod;

    /// Parses an exact, upper-case method token. No case folding is applied.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

/// Exact-match routing key: a path together with a method.
///
/// Paths are compared byte for byte. No trailing-slash, case or percent-decoding
/// normalization is applied on either side of the lookup, so `/hello` and
/// `/hello/` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    path: String,
    method: RequestMethod,
}

impl RouteKey {
    #[must_use]
    pub fn new(path: impl Into<String>, method: RequestMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> RequestMethod {
        self.method
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

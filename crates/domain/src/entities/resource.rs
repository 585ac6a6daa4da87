//! Requests and responses handled by the offline cache

use serde::{Deserialize, Serialize};

use crate::value_objects::RequestMethod;

/// An intercepted resource request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// HTTP method
    pub method: RequestMethod,
    /// Absolute or origin-relative URL
    pub url: String,
}

impl ResourceRequest {
    /// Create a request with an explicit method
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Whether the request participates in caching at all
    pub const fn is_cacheable(&self) -> bool {
        self.method.is_cacheable()
    }
}

/// A captured response: status, headers and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in received order
    pub headers: Vec<(String, String)>,
    /// Raw body
    pub body: Vec<u8>,
}

impl ResourceResponse {
    /// Create a response without headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a `200 OK` response
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Append a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up the first header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Any 2xx status
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Only an exact `200` response is written to the runtime cache
    pub const fn is_runtime_cacheable(&self) -> bool {
        self.status == 200
    }
}

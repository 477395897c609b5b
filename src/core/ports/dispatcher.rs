//! Request dispatch port
//!
//! The dispatcher turns requests into responses. The controller never looks
//! inside it; it only hands it to the engine.

use std::net::SocketAddr;

/// A request as seen by the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRequest {
    /// HTTP method (`GET`, `POST`, ...)
    pub method: String,
    /// The listen URI the request arrived under
    pub base_uri: String,
    /// Path relative to the listen URI, always starting with `/`
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    /// Request headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Vec<u8>,
    /// Peer address, when the engine knows it
    pub remote_addr: Option<SocketAddr>,
}

impl DispatchRequest {
    /// Create a bodiless request for `method` and `path`
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Look up a header value, ignoring case
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response produced by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl DispatchResponse {
    /// Empty response with the given status
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Plain text response
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.into_bytes())
    }

    /// JSON response
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(value.to_string().into_bytes())
    }

    /// 404 response
    #[must_use]
    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    /// 500 response
    #[must_use]
    pub fn internal_error() -> Self {
        Self::text(500, "Internal Server Error")
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Turns requests into responses inside the engine
///
/// Implementations are shared with engine worker threads and must be
/// `Send + Sync`. Any matching closure is a dispatcher.
pub trait Dispatcher: Send + Sync {
    /// Produce the response for one request
    fn dispatch(&self, request: &DispatchRequest) -> DispatchResponse;
}

impl<F> Dispatcher for F
where
    F: Fn(&DispatchRequest) -> DispatchResponse + Send + Sync,
{
    fn dispatch(&self, request: &DispatchRequest) -> DispatchResponse {
        self(request)
    }
}

//! HTTP transport abstraction and implementations
//!
//! This module defines the [`Transport`] trait, the only network touchpoint
//! the login flow requires. Concrete implementations live in submodules:
//!
//! - [`http::ReqwestTransport`] -- production transport backed by
//!   `reqwest` with a configurable per-request timeout.
//! - [`fake::FakeTransport`] -- in-process recording fake used in tests
//!   (cfg(test) only).
//!
//! # Design
//!
//! The trait is intentionally minimal: callers build an [`HttpRequest`]
//! (method, URL, headers) and receive an [`HttpResponse`] (status, raw body
//! bytes). Status interpretation and JSON parsing belong to the caller, so a
//! non-success status is *not* a transport error.
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use fslogin::transport::Transport;
//! ```

use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::error::Result;

/// HTTP methods used by the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// An outbound HTTP request with an empty body.
///
/// # Examples
///
/// ```
/// use fslogin::transport::{HttpRequest, Method};
/// use url::Url;
///
/// let request = HttpRequest::get(Url::parse("https://api.example.com/users/current").unwrap())
///     .with_header("Accept", "application/json");
///
/// assert_eq!(request.method, Method::Get);
/// assert_eq!(request.header("accept"), Some("application/json"));
/// ```
#[derive(Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute request URL, including any query string.
    pub url: Url,
    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a GET request for `url` with no headers.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
        }
    }

    /// Creates a POST request for `url` with no headers and an empty body.
    pub fn post(url: Url) -> Self {
        Self {
            method: Method::Post,
            url,
            headers: Vec::new(),
        }
    }

    /// Appends a header and returns the request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// The query string may carry a password and the Authorization header a
// bearer token, so neither is printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &redacted_url(&self.url))
            .field("headers", &header_names)
            .finish()
    }
}

/// A raw HTTP response: status code and body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as lossy UTF-8, truncated to `max_chars` characters.
    ///
    /// Used to include a short excerpt of an unexpected body in error
    /// messages.
    pub fn body_excerpt(&self, max_chars: usize) -> String {
        let text = String::from_utf8_lossy(&self.body);
        if text.chars().count() <= max_chars {
            text.into_owned()
        } else {
            let mut excerpt: String = text.chars().take(max_chars).collect();
            excerpt.push_str("...");
            excerpt
        }
    }
}

/// Returns `url` as a string with its query and fragment removed.
///
/// The token request carries the user's password in the query string, so
/// every log line and error message that mentions a URL goes through this.
///
/// # Examples
///
/// ```
/// use fslogin::transport::redacted_url;
/// use url::Url;
///
/// let url = Url::parse("https://ident.example.com/token?username=a&password=b").unwrap();
/// assert_eq!(redacted_url(&url), "https://ident.example.com/token");
/// ```
pub fn redacted_url(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean.to_string()
}

/// Abstraction over HTTP transport implementations.
///
/// A [`fake::FakeTransport`] is provided for unit tests; integration tests
/// drive [`http::ReqwestTransport`] against a mock server.
///
/// Implementations must be cancel-safe: dropping the returned future
/// abandons the in-flight request without further side effects.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Performs `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FsLoginError::Network`] if the request could
    /// not be completed (connection failure, timeout, body read failure).
    /// A non-success status is returned as an `Ok` response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub mod http;

#[cfg(test)]
pub mod fake;

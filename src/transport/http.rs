//! `reqwest`-backed HTTP transport
//!
//! [`ReqwestTransport`] issues each [`HttpRequest`] on a shared
//! [`reqwest::Client`] built with a per-request timeout, which defaults to
//! [`DEFAULT_TIMEOUT`]. A request that exceeds it fails with
//! [`FsLoginError::Network`].

use std::sync::Arc;
use std::time::Duration;

use crate::error::{FsLoginError, Result};
use crate::transport::{redacted_url, HttpRequest, HttpResponse, Method, Transport};

/// Timeout applied to each request when the caller does not specify one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production transport backed by `reqwest`.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use fslogin::transport::http::ReqwestTransport;
///
/// let transport = ReqwestTransport::new(Duration::from_secs(10), "fslogin/0.1").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Underlying reqwest HTTP client.
    http_client: Arc<reqwest::Client>,
    /// Per-request timeout, kept for error messages.
    timeout: Duration,
}

impl ReqwestTransport {
    /// Construct a new [`ReqwestTransport`].
    ///
    /// # Arguments
    ///
    /// * `timeout` - Per-request timeout covering connect, send, and body
    ///   read.
    /// * `user_agent` - Value of the `User-Agent` header sent on every
    ///   request.
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Config`] if the client cannot be built (for
    /// example when TLS initialisation fails).
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FsLoginError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client: Arc::new(http_client),
            timeout,
        })
    }

    /// Wraps an existing client. The caller is responsible for its timeout.
    pub fn with_client(http_client: Arc<reqwest::Client>) -> Self {
        Self {
            http_client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn map_send_error(&self, request: &HttpRequest, err: reqwest::Error) -> FsLoginError {
        // reqwest includes the full URL in its Display output; never forward it.
        let target = redacted_url(&request.url);
        if err.is_timeout() {
            FsLoginError::Network(format!(
                "{} {} timed out after {}s",
                request.method,
                target,
                self.timeout.as_secs()
            ))
        } else if err.is_connect() {
            FsLoginError::Network(format!(
                "{} {} failed to connect",
                request.method, target
            ))
        } else {
            FsLoginError::Network(format!("{} {} failed", request.method, target))
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.http_client.get(request.url.clone()),
            Method::Post => self.http_client.post(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!(
            method = %request.method,
            url = %redacted_url(&request.url),
            "sending request"
        );

        let resp = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(&request, e))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| self.map_send_error(&request, e))?;

        tracing::debug!(
            method = %request.method,
            url = %redacted_url(&request.url),
            status,
            body_len = body.len(),
            "received response"
        );

        Ok(HttpResponse { status, body })
    }
}

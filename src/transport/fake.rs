//! In-process recording fake transport for unit tests
//!
//! [`FakeTransport`] answers requests from a queue of scripted responses
//! and records every request it receives, so tests can assert on exactly
//! what the code under test sent (and how many times).
//!
//! # Usage
//!
//! ```ignore
//! let transport = FakeTransport::new();
//! transport.push_json(200, serde_json::json!({"access_token": "abc"}));
//!
//! // ... drive the code under test ...
//!
//! assert_eq!(transport.call_count(), 1);
//! let sent = transport.requests();
//! ```
//!
//! When the queue is empty the fake answers with a transport failure, so an
//! unexpected extra request shows up as a `Network` error rather than a hang.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{FsLoginError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// A scripted reply.
#[derive(Debug)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
    /// Never completes; used to exercise cancellation.
    Hang,
}

/// Recording fake implementing [`Transport`].
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    /// Creates a fake with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and raw body.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .push_back(Scripted::Respond(HttpResponse::new(status, body.into())));
    }

    /// Queues a response whose body is the serialized `value`.
    pub fn push_json(&self, status: u16, value: serde_json::Value) {
        self.push_response(status, value.to_string());
    }

    /// Queues a transport-level failure.
    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Queues a request that never completes.
    pub fn push_hang(&self) {
        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .push_back(Scripted::Hang);
    }

    /// Returns a copy of every request received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .clone()
    }

    /// Returns the number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .len()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .push(request);

        let next = self
            .script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .pop_front();

        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(FsLoginError::Network(message)),
            Some(Scripted::Hang) => loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            },
            None => Err(FsLoginError::Network(
                "FakeTransport: no scripted response".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url() -> Url {
        Url::parse("https://example.com/x").unwrap()
    }

    #[tokio::test]
    async fn test_scripted_responses_are_returned_in_order() {
        let transport = FakeTransport::new();
        transport.push_response(200, "first");
        transport.push_response(404, "second");

        let a = transport.send(HttpRequest::get(url())).await.unwrap();
        let b = transport.send(HttpRequest::get(url())).await.unwrap();

        assert_eq!(a.status, 200);
        assert_eq!(&a.body[..], b"first");
        assert_eq!(b.status, 404);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_script_fails_with_network_error() {
        let transport = FakeTransport::new();
        let err = transport.send(HttpRequest::get(url())).await.unwrap_err();
        assert!(matches!(err, FsLoginError::Network(_)));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hang_never_resolves() {
        let transport = FakeTransport::new();
        transport.push_hang();
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            transport.send(HttpRequest::get(url())),
        )
        .await;
        assert!(result.is_err(), "hang must not complete");
    }
}

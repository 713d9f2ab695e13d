//! OAuth2 password-grant token exchange
//!
//! [`TokenExchanger`] trades a username, password, and client id for a
//! bearer token at the discovered token endpoint, then hands the token to
//! the configured [`CredentialStore`].
//!
//! # Wire format
//!
//! The request is a `POST` with an empty body; all four parameters travel
//! in the query string, in this order:
//!
//! ```text
//! POST <token_url>?username=..&password=..&grant_type=password&client_id=..
//! ```
//!
//! This mirrors the service integration this client was written against.
//! Note that it places the password in the request line, where proxies and
//! server access logs may record it. The client itself only ever logs the
//! URL with its query stripped.
//!
//! The success response is an RFC 6749 token response; only the
//! `access_token` field is read.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::credential_store::{CredentialStore, DEFAULT_ACCESS_TOKEN_KEY};
use crate::error::{FsLoginError, Result};
use crate::transport::{redacted_url, HttpRequest, Transport};

/// The only grant type this client issues.
pub const GRANT_TYPE_PASSWORD: &str = "password";

/// Username, password, and application client id for one login attempt.
///
/// Owned by the caller and never persisted. The `Debug` output redacts the
/// password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username (usually an email-style login).
    pub username: String,
    /// Account password.
    pub password: String,
    /// Application key issued by the service.
    pub client_id: String,
}

impl Credentials {
    /// Creates a new credential set.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            client_id: client_id.into(),
        }
    }

    /// Checks that username and password are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(FsLoginError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(FsLoginError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// An opaque OAuth2 bearer token.
///
/// # Examples
///
/// ```
/// use fslogin::auth::token::AccessToken;
///
/// let token = AccessToken::new("abc123");
/// assert_eq!(token.as_str(), "abc123");
/// assert_eq!(token.bearer_header(), "Bearer abc123");
/// assert!(!format!("{:?}", token).contains("abc123"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Consumes the token and returns the raw string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} chars>)", self.0.len())
    }
}

/// Performs the password-grant token request and persists the result.
#[derive(Clone)]
pub struct TokenExchanger {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    store_key: String,
}

impl fmt::Debug for TokenExchanger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchanger")
            .field("transport", &self.transport)
            .field("store_key", &self.store_key)
            .finish_non_exhaustive()
    }
}

impl TokenExchanger {
    /// Creates an exchanger persisting tokens under
    /// [`DEFAULT_ACCESS_TOKEN_KEY`].
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            store,
            store_key: DEFAULT_ACCESS_TOKEN_KEY.to_string(),
        }
    }

    /// Overrides the credential store key.
    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    /// Exchanges `credentials` for an access token at `token_url`.
    ///
    /// On success the token has already been written once to the credential
    /// store when this returns.
    ///
    /// # Errors
    ///
    /// - [`FsLoginError::Network`] on transport failure or an unexpected
    ///   non-success status.
    /// - [`FsLoginError::Auth`] on a `400`/`401` OAuth2 error response, or a
    ///   JSON object without a string `access_token`.
    /// - [`FsLoginError::Parse`] if a success body is not a JSON object.
    /// - [`FsLoginError::Keyring`] / [`FsLoginError::CredentialStore`] if
    ///   the token cannot be persisted.
    pub async fn exchange(&self, token_url: &Url, credentials: &Credentials) -> Result<AccessToken> {
        let request_url = build_token_request_url(token_url, credentials);
        let request = HttpRequest::post(request_url).with_header("Accept", "application/json");

        let resp = self.transport.send(request).await?;

        if resp.status == 400 || resp.status == 401 {
            let detail = serde_json::from_slice::<Value>(&resp.body)
                .ok()
                .and_then(|body| oauth_error_detail(&body))
                .unwrap_or_else(|| format!("token endpoint returned {}", resp.status));
            return Err(FsLoginError::Auth(detail));
        }

        if !resp.is_success() {
            return Err(FsLoginError::Network(format!(
                "token endpoint {} returned {}: {}",
                redacted_url(token_url),
                resp.status,
                resp.body_excerpt(200)
            )));
        }

        let body: Value = serde_json::from_slice(&resp.body)
            .map_err(|e| FsLoginError::Parse(format!("failed to parse token response: {e}")))?;

        let token = parse_access_token(&body)?;

        self.store.store(&self.store_key, token.as_str())?;
        tracing::debug!(key = %self.store_key, "persisted access token");

        Ok(token)
    }
}

/// Appends the password-grant parameters to `token_url`.
///
/// Existing query pairs on the discovered URL are kept.
pub(crate) fn build_token_request_url(token_url: &Url, credentials: &Credentials) -> Url {
    let mut url = token_url.clone();
    url.query_pairs_mut()
        .append_pair("username", &credentials.username)
        .append_pair("password", &credentials.password)
        .append_pair("grant_type", GRANT_TYPE_PASSWORD)
        .append_pair("client_id", &credentials.client_id);
    url
}

fn parse_access_token(body: &Value) -> Result<AccessToken> {
    let object = body.as_object().ok_or_else(|| {
        FsLoginError::Parse("token response is not a JSON object".to_string())
    })?;

    match object.get("access_token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(FsLoginError::Auth(
            oauth_error_detail(body)
                .unwrap_or_else(|| "token response has no access_token".to_string()),
        )),
    }
}

/// Formats the RFC 6749 section 5.2 `error` / `error_description` fields.
fn oauth_error_detail(body: &Value) -> Option<String> {
    let error = body.get("error").and_then(Value::as_str)?;
    match body.get("error_description").and_then(Value::as_str) {
        Some(description) => Some(format!("{error}: {description}")),
        None => Some(error.to_string()),
    }
}

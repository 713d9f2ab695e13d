//! Endpoint discovery from the FamilySearch collections document
//!
//! Before logging in, the client fetches a well-known collections document
//! and reads the URLs of the OAuth2 token endpoint and the current-user
//! endpoint from its link relations, instead of hardcoding them.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "collections": [
//!     {
//!       "id": "FSFT",
//!       "links": {
//!         "http://oauth.net/core/2.0/endpoint/token": { "href": "https://ident.familysearch.org/cis-web/oauth2/v3/token" },
//!         "current-user": { "href": "https://api.familysearch.org/platform/users/current" }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Each relation is looked up in the document's top-level `links` object
//! first, then in the `links` of every entry of `collections`; the first
//! match wins.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::{FsLoginError, Result};
use crate::transport::{redacted_url, HttpRequest, Transport};

/// Link relation naming the OAuth2 token endpoint.
pub const TOKEN_REL: &str = "http://oauth.net/core/2.0/endpoint/token";

/// Link relation naming the current-user endpoint.
pub const CURRENT_USER_REL: &str = "current-user";

/// Production collections document.
pub const DEFAULT_COLLECTIONS_URL: &str = "https://api.familysearch.org/platform/collections";

/// Endpoint URLs resolved from the collections document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryLinks {
    /// The OAuth2 token endpoint.
    pub token_url: Url,
    /// The endpoint returning the authenticated user.
    pub current_user_url: Url,
}

/// Resolves [`DiscoveryLinks`] with a single GET to a collections URL.
///
/// The resolver performs exactly one attempt per call; retry policy is the
/// caller's responsibility.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use url::Url;
/// use fslogin::auth::discovery::EndpointResolver;
/// use fslogin::transport::http::ReqwestTransport;
///
/// # async fn example() -> fslogin::Result<()> {
/// let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(30), "fslogin")?);
/// let resolver = EndpointResolver::new(
///     transport,
///     Url::parse("https://api.familysearch.org/platform/collections").unwrap(),
/// );
/// let links = resolver.resolve().await?;
/// println!("token endpoint: {}", links.token_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    transport: Arc<dyn Transport>,
    collections_url: Url,
}

impl EndpointResolver {
    /// Creates a resolver reading the document at `collections_url`.
    pub fn new(transport: Arc<dyn Transport>, collections_url: Url) -> Self {
        Self {
            transport,
            collections_url,
        }
    }

    /// Returns the configured collections URL.
    pub fn collections_url(&self) -> &Url {
        &self.collections_url
    }

    /// Fetches the collections document and extracts the endpoint links.
    ///
    /// # Errors
    ///
    /// - [`FsLoginError::Network`] if the request fails or the status is not
    ///   2xx.
    /// - [`FsLoginError::Parse`] if the body is not JSON, either link is
    ///   missing, or an `href` is not an absolute URL.
    pub async fn resolve(&self) -> Result<DiscoveryLinks> {
        let request = HttpRequest::get(self.collections_url.clone())
            .with_header("Accept", "application/json");

        let resp = self.transport.send(request).await?;

        if !resp.is_success() {
            return Err(FsLoginError::Network(format!(
                "collections endpoint {} returned {}: {}",
                redacted_url(&self.collections_url),
                resp.status,
                resp.body_excerpt(200)
            )));
        }

        let document: Value = serde_json::from_slice(&resp.body).map_err(|e| {
            FsLoginError::Parse(format!("failed to parse collections document: {e}"))
        })?;

        let links = parse_discovery_links(&document)?;
        tracing::debug!(
            token_url = %links.token_url,
            current_user_url = %links.current_user_url,
            "resolved endpoints"
        );
        Ok(links)
    }
}

/// Extracts both endpoint links from a parsed collections document.
pub(crate) fn parse_discovery_links(document: &Value) -> Result<DiscoveryLinks> {
    let token_url = find_link_href(document, TOKEN_REL)?;
    let current_user_url = find_link_href(document, CURRENT_USER_REL)?;

    Ok(DiscoveryLinks {
        token_url,
        current_user_url,
    })
}

fn find_link_href(document: &Value, rel: &str) -> Result<Url> {
    let root_links = std::iter::once(document.get("links"));
    let collection_links = document
        .get("collections")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|collection| collection.get("links"));

    let link = root_links
        .chain(collection_links)
        .flatten()
        .find_map(|links| links.get(rel))
        .ok_or_else(|| {
            FsLoginError::Parse(format!("collections document has no \"{rel}\" link"))
        })?;

    let href = link.get("href").and_then(Value::as_str).ok_or_else(|| {
        FsLoginError::Parse(format!("\"{rel}\" link has no string href"))
    })?;

    Url::parse(href)
        .map_err(|e| FsLoginError::Parse(format!("\"{rel}\" href {href:?} is not a URL: {e}")))
}

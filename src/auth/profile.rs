//! Current-user profile fetch
//!
//! [`ProfileFetcher`] issues an authenticated GET against the discovered
//! current-user endpoint and maps the first entry of the response's `users`
//! array into a [`UserProfile`].
//!
//! Field reads are best-effort: a missing field, or one that is not a
//! string, leaves the corresponding profile field unset. The one exception
//! is the `links.artifacts` link, which the memories feature needs to locate
//! the user's artifacts; if it is absent the fetch fails with
//! [`FsLoginError::MissingLink`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::token::AccessToken;
use crate::error::{FsLoginError, Result};
use crate::transport::{redacted_url, HttpRequest, Transport};

/// The authenticated user's profile.
///
/// Every field is optional because the service may omit any of them.
/// Serializes with the service's camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_access_pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_user_id: Option<String>,
    /// `links.artifacts.href` of the user record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_href: Option<String>,
}

impl UserProfile {
    /// Returns `(label, value)` pairs for every field, in declaration order.
    ///
    /// Used by the CLI to render the profile as a table.
    pub fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("id", self.id.as_deref()),
            ("contactName", self.contact_name.as_deref()),
            ("helperAccessPin", self.helper_access_pin.as_deref()),
            ("givenName", self.given_name.as_deref()),
            ("familyName", self.family_name.as_deref()),
            ("email", self.email.as_deref()),
            ("country", self.country.as_deref()),
            ("gender", self.gender.as_deref()),
            ("birthDate", self.birth_date.as_deref()),
            ("phoneNumber", self.phone_number.as_deref()),
            ("mailingAddress", self.mailing_address.as_deref()),
            ("preferredLanguage", self.preferred_language.as_deref()),
            ("displayName", self.display_name.as_deref()),
            ("personId", self.person_id.as_deref()),
            ("treeUserId", self.tree_user_id.as_deref()),
            ("artifactsHref", self.artifacts_href.as_deref()),
        ]
    }

    /// Builds a profile from one entry of the `users` array.
    fn from_user_object(user: &Map<String, Value>) -> Result<Self> {
        let field = |name: &str| user.get(name).and_then(Value::as_str).map(str::to_string);

        let artifacts = user
            .get("links")
            .and_then(Value::as_object)
            .ok_or_else(|| FsLoginError::MissingLink("user record has no links".to_string()))?
            .get("artifacts")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                FsLoginError::MissingLink("user record has no links.artifacts".to_string())
            })?;

        Ok(Self {
            id: field("id"),
            contact_name: field("contactName"),
            helper_access_pin: field("helperAccessPin"),
            given_name: field("givenName"),
            family_name: field("familyName"),
            email: field("email"),
            country: field("country"),
            gender: field("gender"),
            birth_date: field("birthDate"),
            phone_number: field("phoneNumber"),
            mailing_address: field("mailingAddress"),
            preferred_language: field("preferredLanguage"),
            display_name: field("displayName"),
            person_id: field("personId"),
            tree_user_id: field("treeUserId"),
            artifacts_href: artifacts
                .get("href")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Parses a current-user response body.
///
/// Returns `Ok(None)` when the `users` array is empty.
pub(crate) fn parse_user_profile(body: &Value) -> Result<Option<UserProfile>> {
    let users = body
        .get("users")
        .ok_or_else(|| FsLoginError::Parse("current-user response has no users field".to_string()))?
        .as_array()
        .ok_or_else(|| FsLoginError::Parse("users field is not an array".to_string()))?;

    let Some(first) = users.first() else {
        return Ok(None);
    };

    let user = first
        .as_object()
        .ok_or_else(|| FsLoginError::Parse("users[0] is not an object".to_string()))?;

    UserProfile::from_user_object(user).map(Some)
}

/// Fetches the authenticated user's profile.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use url::Url;
/// use fslogin::auth::profile::ProfileFetcher;
/// use fslogin::auth::token::AccessToken;
/// use fslogin::transport::http::ReqwestTransport;
///
/// # async fn example() -> fslogin::Result<()> {
/// let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(30), "fslogin")?);
/// let fetcher = ProfileFetcher::new(transport);
/// let url = Url::parse("https://api.familysearch.org/platform/users/current").unwrap();
///
/// match fetcher.fetch(&url, &AccessToken::new("token")).await? {
///     Some(profile) => println!("hello {:?}", profile.display_name),
///     None => println!("no profile"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProfileFetcher {
    transport: Arc<dyn Transport>,
}

impl ProfileFetcher {
    /// Creates a fetcher using `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GETs `user_url` with `token` and parses the first user record.
    ///
    /// Returns `Ok(None)` when the service reports no users.
    ///
    /// # Errors
    ///
    /// - [`FsLoginError::Network`] on transport failure or non-success
    ///   status.
    /// - [`FsLoginError::Parse`] if the body is not JSON, `users` is absent
    ///   or not an array, or the first entry is not an object.
    /// - [`FsLoginError::MissingLink`] if the first entry lacks
    ///   `links.artifacts`.
    pub async fn fetch(&self, user_url: &Url, token: &AccessToken) -> Result<Option<UserProfile>> {
        let request = HttpRequest::get(user_url.clone())
            .with_header("Accept", "application/json")
            .with_header("Authorization", token.bearer_header());

        let resp = self.transport.send(request).await?;

        if !resp.is_success() {
            return Err(FsLoginError::Network(format!(
                "current-user endpoint {} returned {}: {}",
                redacted_url(user_url),
                resp.status,
                resp.body_excerpt(200)
            )));
        }

        let body: Value = serde_json::from_slice(&resp.body).map_err(|e| {
            FsLoginError::Parse(format!("failed to parse current-user response: {e}"))
        })?;

        let profile = parse_user_profile(&body)?;
        if profile.is_none() {
            tracing::warn!("current-user response contained no users");
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    fn user_url() -> Url {
        Url::parse("https://api.example.com/platform/users/current").unwrap()
    }

    #[test]
    fn test_empty_users_is_no_profile() {
        let result = parse_user_profile(&json!({ "users": [] })).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_minimal_user_sets_only_id_and_artifacts() {
        let body = json!({
            "users": [{ "id": "1", "links": { "artifacts": { "href": "http://x" } } }]
        });

        let profile = parse_user_profile(&body).unwrap().unwrap();
        assert_eq!(
            profile,
            UserProfile {
                id: Some("1".to_string()),
                artifacts_href: Some("http://x".to_string()),
                ..UserProfile::default()
            }
        );
    }

    #[test]
    fn test_user_without_links_is_missing_link_error() {
        let body = json!({ "users": [{ "id": "1" }] });
        let err = parse_user_profile(&body).unwrap_err();
        assert!(matches!(err, FsLoginError::MissingLink(_)), "got {err:?}");
    }

    #[test]
    fn test_user_without_artifacts_is_missing_link_error() {
        let body = json!({
            "users": [{ "id": "1", "links": { "person": { "href": "http://p" } } }]
        });
        let err = parse_user_profile(&body).unwrap_err();
        assert!(matches!(err, FsLoginError::MissingLink(_)));
    }

    #[test]
    fn test_artifacts_without_href_leaves_field_unset() {
        let body = json!({ "users": [{ "id": "1", "links": { "artifacts": {} } }] });
        let profile = parse_user_profile(&body).unwrap().unwrap();
        assert!(profile.artifacts_href.is_none());
    }

    #[test]
    fn test_missing_users_is_parse_error() {
        let err = parse_user_profile(&json!({ "persons": [] })).unwrap_err();
        assert!(matches!(err, FsLoginError::Parse(_)));
    }

    #[test]
    fn test_users_not_array_is_parse_error() {
        let err = parse_user_profile(&json!({ "users": { "id": "1" } })).unwrap_err();
        assert!(matches!(err, FsLoginError::Parse(_)));
    }

    #[test]
    fn test_first_user_not_object_is_parse_error() {
        let err = parse_user_profile(&json!({ "users": ["1"] })).unwrap_err();
        assert!(matches!(err, FsLoginError::Parse(_)));
    }

    #[test]
    fn test_full_user_maps_every_field_and_ignores_later_users() {
        let body = json!({
            "users": [
                {
                    "id": "cis.MMM.RX9",
                    "contactName": "Pete Townsend",
                    "helperAccessPin": "12345",
                    "givenName": "Pete",
                    "familyName": "Townsend",
                    "email": "peter@acme.org",
                    "country": "United States",
                    "gender": "MALE",
                    "birthDate": "3 May 1949",
                    "phoneNumber": "555-1212",
                    "mailingAddress": "123 Main St",
                    "preferredLanguage": "en",
                    "displayName": "Pete Townsend",
                    "personId": "KWQS-BBQ",
                    "treeUserId": "PXRQ-FMXT",
                    "links": {
                        "artifacts": { "href": "https://api.example.com/platform/memories/users/cis.MMM.RX9/memories" }
                    }
                },
                { "id": "second", "links": { "artifacts": { "href": "http://ignored" } } }
            ]
        });

        let profile = parse_user_profile(&body).unwrap().unwrap();
        assert_eq!(profile.id.as_deref(), Some("cis.MMM.RX9"));
        assert_eq!(profile.contact_name.as_deref(), Some("Pete Townsend"));
        assert_eq!(profile.helper_access_pin.as_deref(), Some("12345"));
        assert_eq!(profile.given_name.as_deref(), Some("Pete"));
        assert_eq!(profile.family_name.as_deref(), Some("Townsend"));
        assert_eq!(profile.email.as_deref(), Some("peter@acme.org"));
        assert_eq!(profile.country.as_deref(), Some("United States"));
        assert_eq!(profile.gender.as_deref(), Some("MALE"));
        assert_eq!(profile.birth_date.as_deref(), Some("3 May 1949"));
        assert_eq!(profile.phone_number.as_deref(), Some("555-1212"));
        assert_eq!(profile.mailing_address.as_deref(), Some("123 Main St"));
        assert_eq!(profile.preferred_language.as_deref(), Some("en"));
        assert_eq!(profile.display_name.as_deref(), Some("Pete Townsend"));
        assert_eq!(profile.person_id.as_deref(), Some("KWQS-BBQ"));
        assert_eq!(profile.tree_user_id.as_deref(), Some("PXRQ-FMXT"));
        assert_eq!(
            profile.artifacts_href.as_deref(),
            Some("https://api.example.com/platform/memories/users/cis.MMM.RX9/memories")
        );
    }

    #[test]
    fn test_non_string_fields_are_left_unset() {
        let body = json!({
            "users": [{
                "id": 7,
                "email": null,
                "gender": { "type": "MALE" },
                "links": { "artifacts": { "href": "http://x" } }
            }]
        });

        let profile = parse_user_profile(&body).unwrap().unwrap();
        assert!(profile.id.is_none());
        assert!(profile.email.is_none());
        assert!(profile.gender.is_none());
    }

    #[test]
    fn test_profile_serializes_camel_case_and_skips_unset() {
        let profile = UserProfile {
            display_name: Some("Pete".to_string()),
            tree_user_id: Some("PXRQ".to_string()),
            ..UserProfile::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, json!({ "displayName": "Pete", "treeUserId": "PXRQ" }));
    }

    #[tokio::test]
    async fn test_fetch_sends_accept_and_bearer_headers() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(
            200,
            json!({ "users": [{ "id": "1", "links": { "artifacts": { "href": "http://x" } } }] }),
        );

        let fetcher = ProfileFetcher::new(transport.clone());
        let profile = fetcher
            .fetch(&user_url(), &AccessToken::new("abc123"))
            .await
            .unwrap();
        assert!(profile.is_some());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, crate::transport::Method::Get);
        assert_eq!(requests[0].url, user_url());
        assert_eq!(requests[0].header("Accept"), Some("application/json"));
        assert_eq!(requests[0].header("Authorization"), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_fetch_empty_users_returns_none() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, json!({ "users": [] }));

        let result = ProfileFetcher::new(transport)
            .fetch(&user_url(), &AccessToken::new("t"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_is_network_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(401, "");

        let err = ProfileFetcher::new(transport)
            .fetch(&user_url(), &AccessToken::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, FsLoginError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_parse_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(200, "{ users: ");

        let err = ProfileFetcher::new(transport)
            .fetch(&user_url(), &AccessToken::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, FsLoginError::Parse(_)));
    }
}

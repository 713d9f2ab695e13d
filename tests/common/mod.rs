use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fslogin::transport::http::ReqwestTransport;
use fslogin::transport::Transport;

pub const TOKEN_REL: &str = "http://oauth.net/core/2.0/endpoint/token";

pub const COLLECTIONS_PATH: &str = "/platform/collections";
pub const TOKEN_PATH: &str = "/cis-web/oauth2/v3/token";
pub const CURRENT_USER_PATH: &str = "/platform/users/current";

/// Reqwest-backed transport with a short timeout for tests.
#[allow(dead_code)]
pub fn test_transport() -> Arc<dyn Transport> {
    Arc::new(
        ReqwestTransport::new(Duration::from_secs(5), "fslogin-test")
            .expect("failed to build reqwest transport"),
    )
}

#[allow(dead_code)]
pub fn collections_url(server: &MockServer) -> url::Url {
    url::Url::parse(&format!("{}{}", server.uri(), COLLECTIONS_PATH)).expect("valid url")
}

/// Collections document pointing both links back at `base_url`.
#[allow(dead_code)]
pub fn collections_body(base_url: &str) -> Value {
    json!({
        "collections": [{
            "id": "FSFT",
            "links": {
                TOKEN_REL: { "href": format!("{}{}", base_url, TOKEN_PATH) },
                "current-user": { "href": format!("{}{}", base_url, CURRENT_USER_PATH) }
            }
        }]
    })
}

/// Current-user response with a single fully populated user.
#[allow(dead_code)]
pub fn user_body() -> Value {
    json!({
        "users": [{
            "id": "cis.user.MMMM-XXXX",
            "contactName": "jdoe",
            "helperAccessPin": "1234",
            "givenName": "Jane",
            "familyName": "Doe",
            "email": "jane@example.com",
            "country": "United States",
            "gender": "FEMALE",
            "birthDate": "1 January 1970",
            "preferredLanguage": "en",
            "displayName": "Jane Doe",
            "personId": "KWQS-BBQ",
            "treeUserId": "MMMM-XXXX",
            "links": {
                "artifacts": { "href": "https://api.example.org/platform/memories/users/cis.user.MMMM-XXXX/memories" }
            }
        }]
    })
}

/// Mounts 200 responses for all three endpoints.
#[allow(dead_code)]
pub async fn mount_login_endpoints(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(COLLECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(collections_body(&server.uri())))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "family_search"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(CURRENT_USER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

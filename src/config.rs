//! Configuration management for fslogin
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Precedence, lowest to highest: built-in defaults, YAML file,
//! `FSLOGIN_*` environment variables, command-line flags.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::discovery::{EndpointResolver, DEFAULT_COLLECTIONS_URL};
use crate::auth::flow::AuthFlow;
use crate::auth::profile::ProfileFetcher;
use crate::auth::token::TokenExchanger;
use crate::cli::{Cli, Commands};
use crate::credential_store::{
    CredentialStore, KeyringCredentialStore, MemoryCredentialStore, DEFAULT_ACCESS_TOKEN_KEY,
    DEFAULT_KEYRING_SERVICE,
};
use crate::error::{FsLoginError, Result};
use crate::transport::http::ReqwestTransport;
use crate::transport::Transport;

/// Upper bound accepted for `api.timeout_seconds`.
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Main configuration structure for fslogin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service endpoints and HTTP behavior
    #[serde(default)]
    pub api: ApiConfig,
    /// Where the access token is persisted
    #[serde(default)]
    pub credential_store: CredentialStoreConfig,
}

/// Service endpoint and HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// URL of the collections (discovery) document
    #[serde(default = "default_collections_url")]
    pub collections_url: String,

    /// Application key issued by FamilySearch, sent as `client_id`
    #[serde(default)]
    pub client_id: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `User-Agent` header sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_collections_url() -> String {
    DEFAULT_COLLECTIONS_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("fslogin/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            collections_url: default_collections_url(),
            client_id: String::new(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

/// Credential store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// OS native keyring
    #[default]
    Keyring,
    /// Process memory only; the token is discarded on exit
    Memory,
}

impl std::str::FromStr for CredentialBackend {
    type Err = FsLoginError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(FsLoginError::Config(format!(
                "Invalid credential backend: {}. Must be one of: keyring, memory",
                other
            ))),
        }
    }
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialStoreConfig {
    /// Backend used to persist the access token
    #[serde(default)]
    pub backend: CredentialBackend,

    /// Keyring service name
    #[serde(default = "default_service")]
    pub service: String,

    /// Key under which the access token is stored
    #[serde(default = "default_access_token_key")]
    pub access_token_key: String,
}

fn default_service() -> String {
    DEFAULT_KEYRING_SERVICE.to_string()
}

fn default_access_token_key() -> String {
    DEFAULT_ACCESS_TOKEN_KEY.to_string()
}

impl Default for CredentialStoreConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            service: default_service(),
            access_token_key: default_access_token_key(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Io`] if the file cannot be read and
    /// [`FsLoginError::Yaml`] if it cannot be parsed
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("FSLOGIN_COLLECTIONS_URL") {
            tracing::debug!(collections_url = %url, "Env override: FSLOGIN_COLLECTIONS_URL");
            self.api.collections_url = url;
        }

        if let Ok(client_id) = std::env::var("FSLOGIN_CLIENT_ID") {
            tracing::debug!("Env override: FSLOGIN_CLIENT_ID");
            self.api.client_id = client_id;
        }

        if let Ok(timeout) = std::env::var("FSLOGIN_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid FSLOGIN_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("FSLOGIN_CREDENTIAL_BACKEND") {
            match backend.parse() {
                Ok(value) => self.credential_store.backend = value,
                Err(_) => tracing::warn!("Invalid FSLOGIN_CREDENTIAL_BACKEND: {}", backend),
            }
        }

        if let Ok(service) = std::env::var("FSLOGIN_KEYRING_SERVICE") {
            tracing::debug!(service = %service, "Env override: FSLOGIN_KEYRING_SERVICE");
            self.credential_store.service = service;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Login {
                client_id,
                collections_url,
                ..
            } => {
                if let Some(id) = client_id {
                    self.api.client_id = id.clone();
                }
                if let Some(url) = collections_url {
                    self.api.collections_url = url.clone();
                }
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Config`] describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let url = self.collections_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FsLoginError::Config(format!(
                "api.collections_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.api.client_id.trim().is_empty() {
            return Err(FsLoginError::Config(
                "api.client_id cannot be empty (set it in the config file, FSLOGIN_CLIENT_ID, or --client-id)"
                    .to_string(),
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(FsLoginError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.api.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(FsLoginError::Config(format!(
                "api.timeout_seconds must be less than or equal to {}",
                MAX_TIMEOUT_SECONDS
            )));
        }

        if self.credential_store.access_token_key.trim().is_empty() {
            return Err(FsLoginError::Config(
                "credential_store.access_token_key cannot be empty".to_string(),
            ));
        }

        if self.credential_store.backend == CredentialBackend::Keyring
            && self.credential_store.service.trim().is_empty()
        {
            return Err(FsLoginError::Config(
                "credential_store.service cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the parsed collections URL.
    pub fn collections_url(&self) -> Result<Url> {
        Url::parse(&self.api.collections_url).map_err(|e| {
            FsLoginError::Config(format!(
                "api.collections_url {:?} is not a valid URL: {}",
                self.api.collections_url, e
            ))
        })
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// Builds the credential store selected by `credential_store.backend`.
    pub fn build_credential_store(&self) -> Arc<dyn CredentialStore> {
        match self.credential_store.backend {
            CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(
                self.credential_store.service.clone(),
            )),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        }
    }

    /// Builds an [`AuthFlow`] wired to a reqwest transport and the
    /// configured credential store.
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Config`] if the collections URL is invalid or
    /// the HTTP client cannot be built.
    pub fn build_auth_flow(&self) -> Result<AuthFlow> {
        let transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new(self.timeout(), &self.api.user_agent)?);
        self.build_auth_flow_with(transport, self.build_credential_store())
    }

    /// Builds an [`AuthFlow`] from this configuration with an explicit
    /// transport and store.
    pub fn build_auth_flow_with(
        &self,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<AuthFlow> {
        let resolver = EndpointResolver::new(Arc::clone(&transport), self.collections_url()?);
        let exchanger = TokenExchanger::new(Arc::clone(&transport), store)
            .with_store_key(self.credential_store.access_token_key.clone());
        let fetcher = ProfileFetcher::new(transport);

        Ok(AuthFlow::from_parts(resolver, exchanger, fetcher))
    }
}

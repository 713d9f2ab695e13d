//! Error types for fslogin
//!
//! This module defines the failure taxonomy shared by every step of the
//! login flow, using `thiserror` for ergonomic error handling.
//!
//! Each component returns exactly one typed failure; the orchestrator
//! surfaces the first failure it sees without wrapping it.

use std::fmt;

use thiserror::Error;

/// Main error type for fslogin operations
///
/// Covers input validation, transport failures, response parsing,
/// authentication rejections, credential persistence, and configuration.
#[derive(Error, Debug)]
pub enum FsLoginError {
    /// Caller supplied bad input; no network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport-level failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed JSON or a required field is absent
    #[error("Parse error: {0}")]
    Parse(String),

    /// The token endpoint answered but did not issue a token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The user record lacks the `links.artifacts` link
    #[error("Missing link: {0}")]
    MissingLink(String),

    /// The current-user endpoint returned an empty `users` array
    #[error("No user profile found for the authenticated account")]
    NoProfile,

    /// The caller cancelled the login attempt
    #[error("Login cancelled")]
    Cancelled,

    /// A credential store rejected the token write
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors when rendering output
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FsLoginError {
    /// Returns the copyable category of this error.
    ///
    /// Used by [`crate::auth::flow::FlowState::Failed`] so progress observers
    /// can see why a flow stopped without owning the error itself.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Auth(_) => ErrorKind::Auth,
            Self::MissingLink(_) => ErrorKind::MissingLink,
            Self::NoProfile => ErrorKind::NoProfile,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::CredentialStore(_) | Self::Keyring(_) => ErrorKind::CredentialStore,
            Self::Config(_) | Self::Io(_) | Self::Yaml(_) => ErrorKind::Config,
            Self::Serialization(_) => ErrorKind::Parse,
        }
    }
}

/// Category of an [`FsLoginError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    Parse,
    Auth,
    MissingLink,
    NoProfile,
    Cancelled,
    CredentialStore,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Parse => "parse",
            Self::Auth => "auth",
            Self::MissingLink => "missing_link",
            Self::NoProfile => "no_profile",
            Self::Cancelled => "cancelled",
            Self::CredentialStore => "credential_store",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// Result type alias for fslogin operations
pub type Result<T> = std::result::Result<T, FsLoginError>;

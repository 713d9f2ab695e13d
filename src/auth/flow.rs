//! Login orchestration
//!
//! [`AuthFlow`] runs the three login steps strictly in sequence:
//!
//! 1. [`EndpointResolver::resolve`] -- discover the token and current-user
//!    URLs.
//! 2. [`TokenExchanger::exchange`] -- trade credentials for a bearer token
//!    (persisting it to the credential store).
//! 3. [`ProfileFetcher::fetch`] -- load the authenticated user's profile.
//!
//! The first failure short-circuits the remaining steps and is returned
//! unchanged.
//!
//! # State machine
//!
//! ```text
//! Idle -> Resolving -> Exchanging -> FetchingProfile -> Done
//!   \________\______________\______________\----------> Failed(kind)
//! ```
//!
//! Callers that want to show progress (a spinner, a status line) can use
//! [`AuthFlow::login_with_progress`] to observe each transition.
//!
//! `AuthFlow` holds no mutable state. Concurrent `login` calls are
//! independent attempts; nothing de-duplicates or serializes them.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::discovery::EndpointResolver;
use crate::auth::profile::{ProfileFetcher, UserProfile};
use crate::auth::token::{AccessToken, Credentials, TokenExchanger};
use crate::credential_store::CredentialStore;
use crate::error::{ErrorKind, FsLoginError, Result};
use crate::transport::Transport;

/// Position of a login attempt in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Resolving,
    Exchanging,
    FetchingProfile,
    Done,
    Failed(ErrorKind),
}

impl FlowState {
    /// Returns `true` for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Resolving => f.write_str("resolving"),
            Self::Exchanging => f.write_str("exchanging"),
            Self::FetchingProfile => f.write_str("fetching_profile"),
            Self::Done => f.write_str("done"),
            Self::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// The authenticated user's profile.
    pub profile: UserProfile,
    /// The bearer token issued for this session.
    pub access_token: AccessToken,
}

/// Sequences discovery, token exchange, and profile fetch.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use url::Url;
/// use fslogin::auth::flow::AuthFlow;
/// use fslogin::auth::token::Credentials;
/// use fslogin::credential_store::KeyringCredentialStore;
/// use fslogin::transport::http::ReqwestTransport;
///
/// # async fn example() -> fslogin::Result<()> {
/// let flow = AuthFlow::new(
///     Arc::new(ReqwestTransport::new(Duration::from_secs(30), "fslogin")?),
///     Arc::new(KeyringCredentialStore::default()),
///     Url::parse("https://api.familysearch.org/platform/collections").unwrap(),
/// );
///
/// let session = flow
///     .login(&Credentials::new("jdoe", "password", "APP-KEY"))
///     .await?;
/// println!("logged in as {:?}", session.profile.display_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthFlow {
    resolver: EndpointResolver,
    exchanger: TokenExchanger,
    fetcher: ProfileFetcher,
}

impl AuthFlow {
    /// Builds a flow whose three steps share `transport`.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        collections_url: Url,
    ) -> Self {
        Self {
            resolver: EndpointResolver::new(Arc::clone(&transport), collections_url),
            exchanger: TokenExchanger::new(Arc::clone(&transport), store),
            fetcher: ProfileFetcher::new(transport),
        }
    }

    /// Builds a flow from individually configured steps.
    pub fn from_parts(
        resolver: EndpointResolver,
        exchanger: TokenExchanger,
        fetcher: ProfileFetcher,
    ) -> Self {
        Self {
            resolver,
            exchanger,
            fetcher,
        }
    }

    /// Runs the full login sequence.
    ///
    /// # Errors
    ///
    /// - [`FsLoginError::Validation`] if the username or password is empty;
    ///   no request is sent.
    /// - [`FsLoginError::NoProfile`] if the service reports no user for the
    ///   new token.
    /// - Otherwise the first error returned by a step, unchanged.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSession> {
        self.login_with_progress(credentials, |_| {}).await
    }

    /// Runs the login sequence, reporting every state transition.
    ///
    /// `observer` is called with `Idle` first and exactly one terminal state
    /// last.
    pub async fn login_with_progress<F>(
        &self,
        credentials: &Credentials,
        mut observer: F,
    ) -> Result<LoginSession>
    where
        F: FnMut(FlowState) + Send,
    {
        observer(FlowState::Idle);

        let result = self.run_steps(credentials, &mut observer).await;

        match &result {
            Ok(_) => {
                tracing::info!(username = %credentials.username, "login succeeded");
                observer(FlowState::Done);
            }
            Err(e) => {
                tracing::warn!(
                    username = %credentials.username,
                    kind = %e.kind(),
                    error = %e,
                    "login failed"
                );
                observer(FlowState::Failed(e.kind()));
            }
        }

        result
    }

    /// Runs the login sequence until it finishes or `cancel` fires.
    ///
    /// Cancellation drops the in-flight request. If it fires before the
    /// token response has been processed, no token is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Cancelled`] on cancellation, otherwise the
    /// same errors as [`login`](Self::login).
    pub async fn login_until_cancelled(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<LoginSession> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(username = %credentials.username, "login cancelled");
                Err(FsLoginError::Cancelled)
            }
            result = self.login(credentials) => result,
        }
    }

    async fn run_steps<F>(&self, credentials: &Credentials, observer: &mut F) -> Result<LoginSession>
    where
        F: FnMut(FlowState) + Send,
    {
        credentials.validate()?;

        observer(FlowState::Resolving);
        tracing::debug!(
            collections_url = %self.resolver.collections_url(),
            "resolving endpoints"
        );
        let links = self.resolver.resolve().await?;

        observer(FlowState::Exchanging);
        tracing::debug!("exchanging credentials for access token");
        let access_token = self.exchanger.exchange(&links.token_url, credentials).await?;

        observer(FlowState::FetchingProfile);
        tracing::debug!("fetching current user profile");
        let profile = self
            .fetcher
            .fetch(&links.current_user_url, &access_token)
            .await?
            .ok_or(FsLoginError::NoProfile)?;

        Ok(LoginSession {
            profile,
            access_token,
        })
    }
}

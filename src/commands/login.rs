//! Login command for fslogin
//!
//! Runs the password-grant login against the configured service and prints
//! the authenticated user's profile as a table or as JSON.

use std::future::Future;

use colored::Colorize;
use prettytable::{format, row, Table};

use crate::auth::flow::{AuthFlow, FlowState, LoginSession};
use crate::auth::profile::UserProfile;
use crate::auth::token::Credentials;
use crate::config::Config;
use crate::error::{FsLoginError, Result};

/// Log in and print the current user's profile
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `username` - FamilySearch username
/// * `password` - Account password; `None` is treated as empty
/// * `json` - Print the profile as JSON instead of a table
///
/// # Errors
///
/// Returns the first error raised by the login flow, or
/// [`FsLoginError::Cancelled`] if the user pressed Ctrl-C.
///
/// # Examples
///
/// ```no_run
/// use fslogin::config::Config;
/// use fslogin::commands::login::run_login;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut config = Config::default();
/// config.api.client_id = "APP-KEY".to_string();
/// run_login(&config, "jdoe".to_string(), Some("password".to_string()), false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_login(
    config: &Config,
    username: String,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let flow = config.build_auth_flow()?;
    let credentials = Credentials::new(
        username,
        password.unwrap_or_default(),
        config.api.client_id.clone(),
    );

    tracing::info!(
        username = %credentials.username,
        backend = ?config.credential_store.backend,
        "Starting login"
    );

    let session = login_interruptible(&flow, &credentials, !json).await?;

    if json {
        output_profile_json(&session.profile)?;
    } else {
        output_profile_table(&session, &credentials.username);
    }

    Ok(())
}

/// Runs the login, aborting on Ctrl-C.
async fn login_interruptible(
    flow: &AuthFlow,
    credentials: &Credentials,
    show_progress: bool,
) -> Result<LoginSession> {
    login_until_signal(flow, credentials, show_progress, tokio::signal::ctrl_c()).await
}

/// Runs the login until it finishes or `signal` resolves with `Ok`.
async fn login_until_signal<S>(
    flow: &AuthFlow,
    credentials: &Credentials,
    show_progress: bool,
    signal: S,
) -> Result<LoginSession>
where
    S: Future<Output = std::io::Result<()>>,
{
    let observer = move |state: FlowState| {
        if show_progress {
            report_progress(state);
        }
    };

    tokio::select! {
        biased;
        () = wait_for_signal(signal) => {
            tracing::info!("Interrupted");
            Err(FsLoginError::Cancelled)
        }
        result = flow.login_with_progress(credentials, observer) => result,
    }
}

/// Resolves when `signal` fires. Never resolves if the handler could not
/// be installed.
async fn wait_for_signal<S>(signal: S)
where
    S: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Print a one-line status for each in-progress state to stderr
fn report_progress(state: FlowState) {
    let message = match state {
        FlowState::Resolving => "Resolving endpoints...",
        FlowState::Exchanging => "Requesting access token...",
        FlowState::FetchingProfile => "Fetching user profile...",
        FlowState::Idle | FlowState::Done | FlowState::Failed(_) => return,
    };
    eprintln!("{}", message.dimmed());
}

/// Output the profile as pretty JSON
///
/// # Errors
///
/// Returns `FsLoginError::Serialization` if serialization fails
fn output_profile_json(profile: &UserProfile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    println!("{}", json);
    Ok(())
}

/// Output the profile as a two-column table
fn output_profile_table(session: &LoginSession, username: &str) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Field".bold(), "Value".bold()]);

    for (label, value) in session.profile.fields() {
        let value = value.unwrap_or("-");
        table.add_row(row![label, value]);
    }

    println!("\n{}", format!("Logged in as {}", username).green());
    table.printstd();
    println!();
}

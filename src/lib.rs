//! fslogin - FamilySearch password-grant login library
//!
//! This library logs a user into FamilySearch with the OAuth2 password
//! grant, persists the issued access token, and fetches the current user's
//! profile.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Endpoint discovery, token exchange, profile fetch, and the
//!   [`AuthFlow`] that sequences them
//! - `transport`: The HTTP seam and its reqwest implementation
//! - `credential_store`: Where the access token is persisted
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Command handlers used by the binary
//!
//! # Example
//!
//! ```no_run
//! use fslogin::{Config, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::default();
//!     config.api.client_id = "APP-KEY".to_string();
//!     config.validate()?;
//!
//!     let flow = config.build_auth_flow()?;
//!     let session = flow
//!         .login(&Credentials::new("jdoe", "password", "APP-KEY"))
//!         .await?;
//!     println!("{:?}", session.profile.display_name);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use auth::flow::{AuthFlow, FlowState, LoginSession};
pub use auth::profile::UserProfile;
pub use auth::token::{AccessToken, Credentials};
pub use config::Config;
pub use credential_store::{CredentialStore, KeyringCredentialStore, MemoryCredentialStore};
pub use error::{ErrorKind, FsLoginError, Result};
pub use transport::Transport;

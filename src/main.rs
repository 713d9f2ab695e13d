//! fslogin - FamilySearch password-grant login
//!
#![doc = "fslogin - FamilySearch password-grant login"]
#![doc = "Main entry point for the fslogin command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fslogin::cli::{Cli, Commands};
use fslogin::commands;
use fslogin::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login {
            username,
            password,
            json,
            ..
        } => {
            commands::login::run_login(&config, username, password, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the default level from
/// info to debug. Logs go to stderr so JSON output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fslogin=debug" } else { "fslogin=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

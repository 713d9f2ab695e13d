//! Command-line interface definition for fslogin
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// fslogin - FamilySearch password-grant login
///
/// Exchanges a username and password for an access token, stores the
/// token, and prints the current user's profile.
#[derive(Parser, Debug, Clone)]
#[command(name = "fslogin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for fslogin
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and print the current user's profile
    Login {
        /// FamilySearch username
        #[arg(short, long)]
        username: String,

        /// Account password; falls back to FSLOGIN_PASSWORD
        #[arg(short, long, env = "FSLOGIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Override the application key from config
        #[arg(long)]
        client_id: Option<String>,

        /// Override the collections (discovery) URL from config
        #[arg(long)]
        collections_url: Option<String>,

        /// Print the profile as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! FamilySearch OAuth2 password-grant login
//!
//! # Module Layout
//!
//! - [`discovery`] -- resolves the token and current-user endpoints from the
//!   collections document
//! - [`token`]     -- password-grant token exchange and credential types
//! - [`profile`]   -- authenticated current-user fetch and [`profile::UserProfile`]
//! - [`flow`]      -- [`flow::AuthFlow`], sequencing the three steps

pub mod discovery;
pub mod flow;
pub mod profile;
pub mod token;

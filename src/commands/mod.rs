/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `login` -- Password-grant login and profile display
*/

pub mod login;

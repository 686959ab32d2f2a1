//! Smashly CLI
//!
//! Command-line front end for the API and browser E2E suites.

pub mod commands;
pub mod output;

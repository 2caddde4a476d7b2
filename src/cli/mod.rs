//! # CLI Module
//!
//! Command-line tooling for handler tables: validate a config file before
//! deploying it, or print the table a dispatcher would be built with.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_command, Cli, Commands};

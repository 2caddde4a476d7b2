//! Unit tests for CLI commands

use crate::cli::commands::run_command;
use crate::cli::{Cli, Commands};
use clap::Parser;
use std::io::Write;

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
}

#[test]
fn test_check_command_parses() {
    let cli = Cli::try_parse_from(["ajax-dispatch", "check", "--config", "handlers.yaml"]).unwrap();
    match cli.command {
        Commands::Check { config } => assert_eq!(config.to_string_lossy(), "handlers.yaml"),
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_routes_requires_config() {
    assert!(Cli::try_parse_from(["ajax-dispatch", "routes"]).is_err());
}

#[test]
fn test_check_reports_count() {
    let f = config_file("handlers:\n  GET:\n    list: Items@list\n  POST:\n    save: [Items@save, name]\n");
    let mut out: Vec<u8> = Vec::new();
    run_command(
        &Commands::Check {
            config: f.path().to_path_buf(),
        },
        &mut out,
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ok: 2 handler(s), discriminator 'action'\n"
    );
}

#[test]
fn test_routes_listing_is_sorted() {
    let f = config_file(
        "discriminator: op\nhandlers:\n  POST:\n    save: [Items@save, name]\n  GET:\n    list: Items@list\n",
    );
    let mut out: Vec<u8> = Vec::new();
    run_command(
        &Commands::Routes {
            config: f.path().to_path_buf(),
        },
        &mut out,
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "GET    op=list -> Items@list",
            "POST   op=save -> Items@save(name)"
        ]
    );
}

#[test]
fn test_check_rejects_bad_method() {
    let f = config_file("handlers:\n  HEAD:\n    list: Items@list\n");
    let err = run_command(
        &Commands::Check {
            config: f.path().to_path_buf(),
        },
        &mut Vec::<u8>::new(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("HEAD"));
}

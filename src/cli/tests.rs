//! Unit tests for CLI commands

use crate::cli::{run, Cli, Commands};
use crate::mapping::DuplicatePolicy;
use clap::Parser;
use std::io::Write;

#[test]
fn test_routes_command_parses() {
    let cli = Cli::try_parse_from(["dispatch-core", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes));
    assert!(cli.config.is_none());
    assert!(cli.base_packages.is_empty());
}

#[test]
fn test_dispatch_command_parses() {
    let cli = Cli::try_parse_from([
        "dispatch-core",
        "dispatch",
        "--method",
        "post",
        "--path",
        "/echo?x=1",
        "--body",
        r#"{"text":"hi"}"#,
        "--base-package",
        "app::web",
        "--base-package",
        "app::legacy",
    ])
    .unwrap();

    match cli.command {
        Commands::Dispatch { ref method, ref path, ref body } => {
            assert_eq!(method, "post");
            assert_eq!(path, "/echo?x=1");
            assert_eq!(body.as_deref(), Some(r#"{"text":"hi"}"#));
        }
        _ => panic!("Expected Dispatch command"),
    }
    assert_eq!(cli.base_packages, vec!["app::web", "app::legacy"]);
}

#[test]
fn test_dispatch_requires_path() {
    assert!(Cli::try_parse_from(["dispatch-core", "dispatch"]).is_err());
}

#[test]
fn test_config_file_and_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "base_packages: [from::file]\nduplicate_routes: reject").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let cli = Cli::try_parse_from(["dispatch-core", "--config", &path, "routes"]).unwrap();
    let config = cli.dispatch_config().unwrap();
    assert_eq!(config.duplicate_routes, DuplicatePolicy::Reject);

    let cli = Cli::try_parse_from(["dispatch-core", "routes", "--config", &path, "--base-package", "from::cli"]).unwrap();
    assert_eq!(cli.dispatch_config().unwrap().base_packages, vec!["from::cli"]);
}

#[test]
fn test_dispatch_unmatched_route_prints_not_found() {
    let cli = Cli::try_parse_from([
        "dispatch-core",
        "dispatch",
        "--path",
        "/nothing/here",
        "--base-package",
        "no_such_crate",
    ])
    .unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("HTTP 404 Not Found"));
}

#[test]
fn test_routes_with_nothing_registered() {
    let cli = Cli::try_parse_from(["dispatch-core", "routes", "--base-package", "no_such_crate"]).unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "no routes registered\n");
}

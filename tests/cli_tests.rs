//! Runs the `dispatch-core` binary against the controllers it links.

use std::io::Write;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dispatch-core"))
        .args(args)
        .env("DISPATCH_LOG_LEVEL", "error")
        .env_remove("DISPATCH_BASE_PACKAGES")
        .env_remove("DISPATCH_DUPLICATE_ROUTES")
        .env_remove("RUST_LOG")
        .output()
        .expect("run cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_lists_routes() {
    let output = run(&["routes"]);
    assert!(output.status.success());
    let text = stdout(&output);

    let lines: Vec<Vec<&str>> = text.lines().map(|l| l.split_whitespace().collect()).collect();
    assert!(lines.contains(&vec!["annotated", "GET", "/hello", "dispatch_core::controllers::greeting::GreetingController::hello"]));
    assert!(lines.contains(&vec!["annotated", "POST", "/echo", "dispatch_core::controllers::greeting::GreetingController::echo"]));
    assert!(lines.contains(&vec!["interface", "GET", "/login", "dispatch_core::controllers::login::LoginController::login"]));

    // Annotated routes are listed before interface routes
    let first_interface = lines.iter().position(|l| l[0] == "interface").unwrap();
    assert!(lines[..first_interface].iter().all(|l| l[0] == "annotated"));
}

#[test]
fn test_cli_dispatches_request() {
    let output = run(&["dispatch", "--path", "/hello"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("HTTP 200 OK\n"));
    assert!(text.contains("content-type: application/json"));
    assert!(text.trim_end().ends_with(r#""hi""#));
}

#[test]
fn test_cli_dispatches_body() {
    let output = run(&["dispatch", "-m", "post", "-p", "/echo", "--body", r#"{"text":"ping"}"#]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(r#""echo":"ping""#));
}

#[test]
fn test_cli_reports_not_found() {
    let output = run(&["dispatch", "--method", "DELETE", "--path", "/hello"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("HTTP 404 Not Found"));
}

#[test]
fn test_cli_interface_controller_view() {
    let output = run(&["dispatch", "--path", "/login"]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with(r#""login""#));
}

#[test]
fn test_cli_config_selects_registries() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "mappings: [interface]\nduplicate_routes: reject").unwrap();

    let output = run(&["routes", "--config", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("/login"));
    assert!(!text.contains("/hello"));
}

#[test]
fn test_cli_missing_config_fails() {
    let output = run(&["routes", "--config", "/definitely/not/here.yaml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load dispatch configuration"));
}

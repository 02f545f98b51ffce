//! CLI smoke tests for the foodgram-server binary: help output, configuration
//! validation and the ingredient import command.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_foodgram_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_foodgram-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute foodgram-server")
}

async fn run_foodgram_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_foodgram-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Config rooted in `dir` so logs and databases stay inside the temp dir.
fn write_config(dir: &Path, body: &str) -> String {
    let home = dir.join("home");
    let content = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 0
{body}
logging:
  default:
    console_level: info
    file: "logs/foodgram.log"
    file_level: info
"#,
        home.display()
    );
    let path = dir.join("foodgram.yaml");
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().into_owned()
}

fn write_ingredients(dir: &Path) -> String {
    let path = dir.join("ingredients.json");
    std::fs::write(
        &path,
        r#"[
  {"name": "salt", "measurement_unit": "g"},
  {"name": " sugar ", "measurement_unit": "g"},
  {"name": "milk", "measurement_unit": "ml"}
]"#,
    )
    .expect("Failed to write ingredients");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_foodgram_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("foodgram-server") || stdout.contains("Foodgram"));
    assert!(stdout.contains("Usage:") || stdout.contains("USAGE:"));
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(
        stdout.contains("load-ingredients"),
        "Should contain 'load-ingredients' subcommand"
    );
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_foodgram_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("foodgram-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_foodgram_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid") || stderr.contains("unexpected"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_foodgram_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Config file not found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_foodgram_server(&["-c", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_foodgram_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("parse"),
        "Should mention parsing issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"sqlite://database/foodgram.db\"",
    );

    let output = run_foodgram_server(&["--config", &config_path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"), "{}", stdout);
}

#[test]
fn test_cli_check_rejects_unsupported_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"mysql://localhost/foodgram\"",
    );

    let output = run_foodgram_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported database type"), "{}", stderr);
}

#[test]
fn test_cli_mock_flag_ignores_database_url() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"postgresql://localhost/nonexistent\"",
    );

    let output = run_foodgram_server(&["--config", &config_path, "--mock", "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "--mock should bypass the configured database");
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_foodgram_server(&["--config", &config_path, "--port", "9191", "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"), "{}", stdout);
}

#[test]
fn test_cli_load_ingredients_into_sqlite_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"sqlite://database/foodgram.db\"",
    );
    let file = write_ingredients(temp_dir.path());

    let first = run_foodgram_server(&["--config", &config_path, "load-ingredients", &file]);
    if !first.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&first.stderr));
    }
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("Loaded 3 new ingredients"));
    assert!(temp_dir.path().join("home/database/foodgram.db").exists());

    // Same file again: every (name, unit) pair already exists
    let second = run_foodgram_server(&["--config", &config_path, "load-ingredients", &file]);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Loaded 0 new ingredients"));
}

#[test]
fn test_cli_load_ingredients_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");
    let file = write_ingredients(temp_dir.path());

    let output =
        run_foodgram_server(&["--config", &config_path, "--mock", "load-ingredients", &file]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Loaded 3 new ingredients"));
}

#[test]
fn test_cli_load_ingredients_rejects_malformed_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");
    let file = temp_dir.path().join("broken.json");
    std::fs::write(&file, r#"{"name": "salt"}"#).expect("Failed to write file");

    let output = run_foodgram_server(&[
        "--config",
        &config_path,
        "--mock",
        "load-ingredients",
        file.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"), "{}", stderr);
}

#[tokio::test]
async fn test_cli_run_command_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let result = run_foodgram_server_with_timeout(
        &["--config", &config_path, "--mock", "run"],
        Duration::from_secs(5),
    )
    .await;

    match result {
        // Still serving when the timeout hit
        Err(err) => assert!(err.to_string().contains("elapsed"), "{}", err),
        Ok(output) => {
            eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
            eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
            panic!("Server exited early");
        }
    }
}

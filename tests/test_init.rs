//! Tests for `pipeboard init` behavior.

mod common;

use common::{init_project, read_data, run, run_commands};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_init_writes_config_and_seeds_data() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = run_commands(temp_dir.path(), &[&["init"]]);
    assert!(output.contains("Created config: pipeboard.toml"));
    assert!(output.contains("Created data file: data.json"));
    assert!(output.contains("Project initialized"));
    assert!(output.contains("exit: 0"));

    let config = fs::read_to_string(temp_dir.path().join("pipeboard.toml")).unwrap();
    assert!(config.contains("data_file = \"data.json\""));

    let data = read_data(temp_dir.path());
    assert_eq!(data["Level1Groups"][0]["name"], "GroupA");
    assert_eq!(
        data["Level1Groups"][0]["subsystems"].as_array().unwrap().len(),
        3
    );
}

#[test]
fn test_init_refuses_to_overwrite_config() {
    let temp_dir = init_project();

    let result = run(temp_dir.path(), &["init"]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("already exists (use -f to overwrite)"));
}

#[test]
fn test_init_force_keeps_existing_data() {
    let temp_dir = init_project();
    assert!(run(temp_dir.path(), &["group", "add", "GroupB"]).status.success());

    let output = run_commands(temp_dir.path(), &[&["init", "-f"]]);
    assert!(output.contains("Keeping existing data file"));
    assert!(output.contains("exit: 0"));

    let data = read_data(temp_dir.path());
    assert_eq!(data["Level1Groups"].as_array().unwrap().len(), 2);
}

#[test]
fn test_init_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = run_commands(temp_dir.path(), &[&["--dry-run", "init"]]);
    assert!(output.contains("[dry-run] Would write: pipeboard.toml"));
    assert!(output.contains("[dry-run] Would seed: data.json"));
    assert!(!temp_dir.path().join("pipeboard.toml").exists());
    assert!(!temp_dir.path().join("data.json").exists());
}

#[test]
fn test_custom_data_file_from_config() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    fs::write(
        temp_dir.path().join("pipeboard.toml"),
        "[paths]\ndata_file = \"state/board.json\"\n",
    )
    .unwrap();

    let result = run(temp_dir.path(), &["status"]);
    assert!(result.status.success());
    assert!(temp_dir.path().join("state/board.json").exists());
    assert!(!temp_dir.path().join("data.json").exists());
}

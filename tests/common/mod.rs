//! Common helpers for CLI integration tests.

#![allow(dead_code)] // Functions used across different test binaries

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Today's date in YYYY-MM-DD format (same as pipeboard uses)
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Normalize output for stable comparisons:
/// - Replace temp directory paths with `<TEMPDIR>`
/// - Replace today's date with `<DATE>`
pub fn normalize_output(output: &str, dir: &Path, date: &str) -> String {
    let dir_str = dir.display().to_string();
    output.replace(&dir_str, "<TEMPDIR>").replace(date, "<DATE>")
}

/// Run pipeboard once in `dir`
pub fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pipeboard"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("PIPEBOARD_LOG")
        .output()
        .expect("failed to run pipeboard")
}

/// Run pipeboard commands in a directory and capture a transcript.
pub fn run_commands(dir: &Path, commands: &[&[&str]]) -> String {
    let mut output = String::new();

    for args in commands {
        output.push_str(&format!("$ pipeboard {}\n", args.join(" ")));

        let result = run(dir, args);
        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);

        if !stdout.is_empty() {
            output.push_str(&stdout);
            if !stdout.ends_with('\n') {
                output.push('\n');
            }
        }
        if !stderr.is_empty() {
            output.push_str(&stderr);
            if !stderr.ends_with('\n') {
                output.push('\n');
            }
        }

        output.push_str(&format!("exit: {}\n\n", result.status.code().unwrap_or(-1)));
    }

    output
}

/// Stdout of a single successful run
pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let result = run(dir, args);
    assert!(
        result.status.success(),
        "pipeboard {} failed:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&result.stderr)
    );
    String::from_utf8_lossy(&result.stdout).into_owned()
}

/// Fresh temp project with config and seeded data file
pub fn init_project() -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let result = run(temp_dir.path(), &["init"]);
    assert!(result.status.success(), "init failed");
    temp_dir
}

/// Parse the project's data file
pub fn read_data(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("data.json")).expect("data.json missing");
    serde_json::from_str(&content).expect("data.json is not JSON")
}

/// Subsystem node by group and subsystem name
pub fn subsystem<'a>(data: &'a serde_json::Value, group: &str, name: &str) -> &'a serde_json::Value {
    data["Level1Groups"]
        .as_array()
        .and_then(|groups| groups.iter().find(|g| g["name"] == group))
        .and_then(|g| g["subsystems"].as_array())
        .and_then(|subs| subs.iter().find(|s| s["name"] == name))
        .expect("subsystem missing")
}

/// Batch record fields for `pipeline add`, with `status` overridden
pub fn batch_fields(name: &str, status: &str) -> Vec<String> {
    [
        format!("pipeline_name={name}"),
        "data_name=sales_daily.csv".to_string(),
        "frequency=daily".to_string(),
        "run_day=Monday".to_string(),
        "run_timestamp=09:00".to_string(),
        "file_size=50".to_string(),
        "uat_date=2024-01-15".to_string(),
        "prod_date=2024-01-25".to_string(),
        format!("status={status}"),
        "comment=Daily sales aggregation".to_string(),
    ]
    .into_iter()
    .flat_map(|f| ["-f".to_string(), f])
    .collect()
}

/// `pipeline add` for one batch record into GroupA/SubsystemX
pub fn add_batch(dir: &Path, name: &str, status: &str) -> Output {
    let mut args: Vec<String> = ["pipeline", "add", "GroupA", "SubsystemX", "batch"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(batch_fields(name, status));
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run(dir, &refs)
}

//! Tests for issue tracking commands.

mod common;

use common::{init_project, read_data, run, stdout_of, subsystem, today};

fn new_issue(dir: &std::path::Path, sub: &str, description: &str, start: &str) -> String {
    let result = run(
        dir,
        &[
            "issue",
            "new",
            "GroupA",
            sub,
            description,
            "--start-date",
            start,
        ],
    );
    assert!(result.status.success());
    String::from_utf8_lossy(&result.stderr).into_owned()
}

#[test]
fn test_new_issue_and_blocked_days() {
    let temp_dir = init_project();

    let stderr = new_issue(temp_dir.path(), "SubsystemY", "Vendor access", "2024-01-01");
    assert!(stderr.contains("Saved issue ISS-101: Open"));

    let stdout = stdout_of(
        temp_dir.path(),
        &["issue", "blocked", "GroupA", "SubsystemY", "--as-of", "2024-01-08"],
    );
    assert_eq!(stdout, "ISS-101\tOpen\t7\n");
}

#[test]
fn test_closed_issue_stops_counting() {
    let temp_dir = init_project();
    new_issue(temp_dir.path(), "SubsystemY", "Vendor access", "2024-01-01");

    let result = run(
        temp_dir.path(),
        &[
            "issue",
            "set",
            "GroupA",
            "SubsystemY",
            "ISS-101",
            "--status",
            "closed",
            "--close-date",
            "2024-01-05",
        ],
    );
    assert!(result.status.success());

    for as_of in ["2024-01-10", "2025-06-01"] {
        let stdout = stdout_of(
            temp_dir.path(),
            &["issue", "blocked", "GroupA", "SubsystemY", "--as-of", as_of],
        );
        assert_eq!(stdout, "ISS-101\tClosed\t4\n");
    }
}

#[test]
fn test_closing_fills_close_date() {
    let temp_dir = init_project();
    new_issue(temp_dir.path(), "SubsystemY", "Vendor access", "2024-01-01");

    let result = run(
        temp_dir.path(),
        &["issue", "set", "GroupA", "SubsystemY", "ISS-101", "--status", "closed"],
    );
    assert!(result.status.success());

    let data = read_data(temp_dir.path());
    let issue = &subsystem(&data, "GroupA", "SubsystemY")["issues"][0];
    assert_eq!(issue["status"], "Closed");
    assert_eq!(issue["close_date"], today().as_str());
}

#[test]
fn test_reopening_clears_close_date() {
    let temp_dir = init_project();
    new_issue(temp_dir.path(), "SubsystemY", "Vendor access", "2024-01-01");
    let set = |args: &[&str]| {
        let mut full = vec!["issue", "set", "GroupA", "SubsystemY", "ISS-101"];
        full.extend_from_slice(args);
        assert!(run(temp_dir.path(), &full).status.success());
    };

    set(&["--status", "closed", "--close-date", "2024-01-05"]);
    set(&["--status", "open"]);

    let data = read_data(temp_dir.path());
    let issue = &subsystem(&data, "GroupA", "SubsystemY")["issues"][0];
    assert_eq!(issue["status"], "Open");
    assert!(issue["close_date"].is_null());

    let stdout = stdout_of(
        temp_dir.path(),
        &["issue", "blocked", "GroupA", "SubsystemY", "--as-of", "2024-01-10"],
    );
    assert_eq!(stdout, "ISS-101\tOpen\t9\n");

    // An explicit close date is kept even when the status leaves Closed
    set(&["--status", "closed", "--close-date", "2024-01-05"]);
    set(&["--status", "in-progress", "--close-date", "2024-01-06"]);
    let data = read_data(temp_dir.path());
    let issue = &subsystem(&data, "GroupA", "SubsystemY")["issues"][0];
    assert_eq!(issue["close_date"], "2024-01-06");
}

#[test]
fn test_inverted_range_rejected_unchanged() {
    let temp_dir = init_project();
    new_issue(temp_dir.path(), "SubsystemY", "Vendor access", "2024-01-01");
    let before = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();

    let result = run(
        temp_dir.path(),
        &[
            "issue",
            "set",
            "GroupA",
            "SubsystemY",
            "ISS-101",
            "--close-date",
            "2023-12-01",
        ],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0203]"));

    let after = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_ids_never_reused() {
    let temp_dir = init_project();

    // SubsystemX is seeded with ISS-101 and ISS-102
    let stderr = new_issue(temp_dir.path(), "SubsystemX", "Quota", "2024-03-01");
    assert!(stderr.contains("Saved issue ISS-103"));

    let result = run(
        temp_dir.path(),
        &["issue", "delete", "GroupA", "SubsystemX", "ISS-103"],
    );
    assert!(result.status.success());

    let stderr = new_issue(temp_dir.path(), "SubsystemX", "Quota again", "2024-03-02");
    assert!(stderr.contains("Saved issue ISS-104"));
}

#[test]
fn test_legacy_issue_needs_start_date_to_edit() {
    let temp_dir = init_project();

    let result = run(
        temp_dir.path(),
        &[
            "issue",
            "set",
            "GroupA",
            "SubsystemX",
            "ISS-101",
            "--description",
            "Delay from source",
        ],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("missing required fields: start_date"));

    let result = run(
        temp_dir.path(),
        &[
            "issue",
            "set",
            "GroupA",
            "SubsystemX",
            "ISS-101",
            "--description",
            "Delay from source",
            "--start-date",
            "2024-02-01",
        ],
    );
    assert!(result.status.success());
}

#[test]
fn test_unknown_issue_and_bad_as_of() {
    let temp_dir = init_project();

    let result = run(
        temp_dir.path(),
        &["issue", "delete", "GroupA", "SubsystemX", "ISS-999"],
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("error[E0303]"));

    let result = run(
        temp_dir.path(),
        &["issue", "blocked", "GroupA", "SubsystemX", "--as-of", "yesterday"],
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("error[E0204]"));
}

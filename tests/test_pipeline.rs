//! Tests for pipeline record commands and stage count derivation.

mod common;

use common::{add_batch, init_project, read_data, run, stdout_of, subsystem};
use serde_json::json;

#[test]
fn test_add_uat_record_derives_counts() {
    let temp_dir = init_project();

    let result = add_batch(temp_dir.path(), "Daily Sales Report", "UAT");
    assert!(result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Added batch record #0 to GroupA/SubsystemX"));
    assert!(stderr.contains("Saved: "));
    assert!(stderr.contains("data.json"));

    let data = read_data(temp_dir.path());
    let sub = subsystem(&data, "GroupA", "SubsystemX");
    assert_eq!(
        sub["pipelines"]["batch"],
        json!({"finalized": 0, "uat": 1, "planned": 0, "production": 0})
    );
    // Counts are rederived for both types
    assert_eq!(
        sub["pipelines"]["streaming"],
        json!({"finalized": 0, "uat": 0, "planned": 0, "production": 0})
    );
    assert_eq!(sub["pipelineDetails"]["batch"][0]["status"], "UAT");
    assert_eq!(
        sub["pipelineDetails"]["batch"][0]["pipeline_name"],
        "Daily Sales Report"
    );
}

#[test]
fn test_bad_numeric_rejected_and_nothing_saved() {
    let temp_dir = init_project();
    let before = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();

    let mut args = vec!["pipeline", "add", "GroupA", "SubsystemX", "batch"];
    let fields = common::batch_fields("Broken", "UAT");
    let mut fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    for f in fields.iter_mut() {
        if *f == "file_size=50" {
            *f = "file_size=abc";
        }
    }
    args.extend(fields);

    let result = run(temp_dir.path(), &args);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0202]"));
    assert!(stderr.contains("'file_size'"));

    let after = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_missing_fields_named() {
    let temp_dir = init_project();

    let result = run(
        temp_dir.path(),
        &[
            "pipeline",
            "add",
            "GroupA",
            "SubsystemY",
            "streaming",
            "-f",
            "pipeline_name=Live",
        ],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0201]"));
    assert!(stderr.contains("start_time"));
    assert!(stderr.contains("rough_volume"));
    assert!(stderr.contains("(GroupA/SubsystemY)"));
}

#[test]
fn test_delete_middle_record_recounts() {
    let temp_dir = init_project();
    for (name, status) in [("a", "UAT"), ("b", "PROD"), ("c", "Planned")] {
        assert!(add_batch(temp_dir.path(), name, status).status.success());
    }

    let result = run(
        temp_dir.path(),
        &["pipeline", "delete", "GroupA", "SubsystemX", "batch", "2"],
    );
    assert!(result.status.success());

    let data = read_data(temp_dir.path());
    let sub = subsystem(&data, "GroupA", "SubsystemX");
    assert_eq!(sub["pipelineDetails"]["batch"].as_array().unwrap().len(), 2);
    assert_eq!(
        sub["pipelines"]["batch"],
        json!({"finalized": 0, "uat": 1, "planned": 0, "production": 1})
    );
}

#[test]
fn test_delete_out_of_range() {
    let temp_dir = init_project();
    assert!(add_batch(temp_dir.path(), "a", "UAT").status.success());

    let result = run(
        temp_dir.path(),
        &["pipeline", "delete", "GroupA", "SubsystemX", "batch", "5"],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0205]: index 5 out of range for 1 batch record(s)"));
}

#[test]
fn test_edit_merges_fields() {
    let temp_dir = init_project();
    assert!(add_batch(temp_dir.path(), "a", "UAT").status.success());

    let result = run(
        temp_dir.path(),
        &[
            "pipeline", "edit", "GroupA", "SubsystemX", "batch", "0", "-f", "status=PROD",
        ],
    );
    assert!(result.status.success());

    let data = read_data(temp_dir.path());
    let sub = subsystem(&data, "GroupA", "SubsystemX");
    let record = &sub["pipelineDetails"]["batch"][0];
    assert_eq!(record["status"], "PROD");
    assert_eq!(record["pipeline_name"], "a");
    assert_eq!(sub["pipelines"]["batch"]["production"], 1);
    assert_eq!(sub["pipelines"]["batch"]["uat"], 0);
}

#[test]
fn test_unknown_subsystem() {
    let temp_dir = init_project();

    let result = run(
        temp_dir.path(),
        &["pipeline", "delete", "GroupA", "Nope", "batch", "0"],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0302]: subsystem not found: GroupA/Nope"));
}

#[test]
fn test_recompute_zeroes_types_without_records() {
    let temp_dir = init_project();

    let result = run(temp_dir.path(), &["recompute"]);
    assert!(result.status.success());

    let data = read_data(temp_dir.path());
    let sub = subsystem(&data, "GroupA", "SubsystemZ");
    assert_eq!(sub["pipelines"]["batch"]["planned"], 0);
    assert_eq!(sub["pipelines"]["streaming"]["planned"], 0);
}

#[test]
fn test_dry_run_leaves_file_untouched() {
    let temp_dir = init_project();
    let before = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();

    let stdout = stdout_of(
        temp_dir.path(),
        &["--dry-run", "subsystem", "add", "GroupA", "SubsystemW"],
    );
    assert!(stdout.starts_with("[dry-run] Would write: "));
    assert!(stdout.lines().next().unwrap().ends_with("data.json"));
    assert!(stdout.contains("\"SubsystemW\""));

    let after = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_import_unreadable_spreadsheet() {
    let temp_dir = init_project();
    let before = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();

    let result = run(
        temp_dir.path(),
        &["pipeline", "import", "GroupA", "SubsystemX", "batch", "missing.xlsx"],
    );
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error[E0401]"));
    assert!(stderr.contains("(missing.xlsx)"));

    let after = std::fs::read_to_string(temp_dir.path().join("data.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_import_spreadsheet_with_blank_cell() {
    let temp_dir = init_project();
    let fixture = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/batch.xlsx");

    let result = run(
        temp_dir.path(),
        &[
            "pipeline",
            "import",
            "GroupA",
            "SubsystemX",
            "batch",
            fixture.to_str().unwrap(),
        ],
    );
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(result.status.success(), "import failed: {stderr}");
    assert!(stderr.contains("Imported 2 batch record(s) into GroupA/SubsystemX"));

    let data = read_data(temp_dir.path());
    let sub = subsystem(&data, "GroupA", "SubsystemX");
    let records = sub["pipelineDetails"]["batch"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["pipeline_name"], "Daily Sales Report");
    assert_eq!(records[0]["file_size"], "50");
    assert_eq!(records[0]["run_timestamp"], "09:00");
    assert_eq!(records[1]["status"], "PROD");
    assert_eq!(records[1]["comment"], "");
    assert_eq!(
        sub["pipelines"]["batch"],
        json!({"finalized": 0, "uat": 1, "planned": 0, "production": 1})
    );
}

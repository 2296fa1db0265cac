//! Check/lint command implementation.

use crate::cmd::open_session;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::store::{WriteOp, load_document};
use crate::ui;
use crate::validate::validate_document;

/// Validate the backing document
pub fn check_all(config: &Config, op: WriteOp) -> anyhow::Result<Vec<Diagnostic>> {
    let path = config.data_path();

    // A malformed file is an error here rather than a silent fallback
    let doc = if path.exists() {
        match load_document(&path) {
            Ok(doc) => doc,
            Err(e) => return Ok(vec![Diagnostic::from_registry(e, path.display().to_string())]),
        }
    } else {
        let mut diags = vec![];
        open_session(config, op, &mut diags)?.doc().clone()
    };

    let result = validate_document(&doc);

    ui::check_header();
    ui::check_count(result.group_count, "groups");
    ui::check_count(result.subsystem_count, "subsystems");
    ui::check_count(result.record_count, "pipeline records");
    ui::check_count(result.issue_count, "issues");
    eprintln!();

    if result.diagnostics.is_empty() {
        ui::success("All checks passed");
    }

    Ok(result.diagnostics)
}

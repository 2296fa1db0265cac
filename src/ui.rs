//! CLI output formatting with colors.
//!
//! Messages go to stderr so stdout stays clean for listings and exports.
//! Colors auto-disable when the stream is not a TTY or `NO_COLOR` is set.

use crate::diagnostic::{Diagnostic, DiagnosticLevel};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::path::Path;

/// Check if stderr supports colors (TTY detection)
pub fn stderr_supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stderr).is_some()
}

/// Check if stdout supports colors (tables, status report)
pub fn stdout_supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn use_colors() -> bool {
    stderr_supports_color()
}

// =============================================================================
// Color Helpers
// =============================================================================

/// Format a success message (green checkmark prefix)
pub fn success(msg: impl Display) {
    if use_colors() {
        eprintln!("{} {}", "✓".green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Format an info/action message (no special prefix)
pub fn info(msg: impl Display) {
    eprintln!("{}", msg);
}

/// Format a created file message
pub fn created(kind: &str, path: &Path) {
    if use_colors() {
        eprintln!("{} {}: {}", "Created".green(), kind, path.display().cyan());
    } else {
        eprintln!("Created {}: {}", kind, path.display());
    }
}

/// Format a saved document message
pub fn saved(path: &Path) {
    if use_colors() {
        eprintln!("{}: {}", "Saved".green(), path.display().cyan());
    } else {
        eprintln!("Saved: {}", path.display());
    }
}

/// Format a subsystem location (cyan, bold)
pub fn location_str(group: &str, subsystem: &str) -> String {
    if use_colors() {
        format!("{}", format!("{group}/{subsystem}").cyan().bold())
    } else {
        format!("{group}/{subsystem}")
    }
}

/// Format a pipeline record change, e.g. "Added batch record #2 to G/S"
pub fn record_changed(action: &str, pipeline_type: &str, index: usize, group: &str, subsystem: &str) {
    let at = location_str(group, subsystem);
    if use_colors() {
        eprintln!(
            "{} {} record #{} {} {}",
            action,
            pipeline_type.yellow(),
            index,
            if action == "Added" { "to" } else { "in" },
            at
        );
    } else {
        eprintln!(
            "{} {} record #{} {} {}",
            action,
            pipeline_type,
            index,
            if action == "Added" { "to" } else { "in" },
            at
        );
    }
}

/// Format a bulk import summary
pub fn imported(count: usize, pipeline_type: &str, group: &str, subsystem: &str) {
    let at = location_str(group, subsystem);
    if use_colors() {
        eprintln!(
            "{} Imported {} {} record(s) into {}",
            "✓".green(),
            count.to_string().cyan().bold(),
            pipeline_type,
            at
        );
    } else {
        eprintln!("✓ Imported {} {} record(s) into {}", count, pipeline_type, at);
    }
}

/// Format stage counts after a recompute: "batch: 1/2/0/3"
pub fn counts_line(pipeline_type: &str, counts: &crate::model::StageCounts) {
    eprintln!(
        "  {:9} finalized={} uat={} planned={} production={}",
        format!("{pipeline_type}:"),
        counts.finalized,
        counts.uat,
        counts.planned,
        counts.production
    );
}

/// Format an issue save message
pub fn issue_saved(id: &str, status: &str) {
    if use_colors() {
        eprintln!("Saved issue {}: {}", id.cyan().bold(), status.green());
    } else {
        eprintln!("Saved issue {}: {}", id, status);
    }
}

/// Format an issue removal message
pub fn issue_deleted(id: &str) {
    if use_colors() {
        eprintln!("Deleted issue {}", id.yellow().bold());
    } else {
        eprintln!("Deleted issue {}", id);
    }
}

/// Format a contacts replacement message
pub fn contacts_set(role: &str, names: &[String]) {
    let list = if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    };
    if use_colors() {
        eprintln!("Set {} = {}", role.yellow(), list.white());
    } else {
        eprintln!("Set {} = {}", role, list);
    }
}

/// Format check summary header
pub fn check_header() {
    if use_colors() {
        eprintln!("{}:", "Checked".bold());
    } else {
        eprintln!("Checked:");
    }
}

/// Format check count line
pub fn check_count(count: usize, kind: &str) {
    if use_colors() {
        eprintln!("  {} {}", count.to_string().cyan().bold(), kind);
    } else {
        eprintln!("  {} {}", count, kind);
    }
}

// =============================================================================
// Diagnostic Formatting
// =============================================================================

/// Format a diagnostic message
pub fn diagnostic(diag: &Diagnostic) {
    if use_colors() {
        let level_str = match diag.level {
            DiagnosticLevel::Error => "error".red().bold().to_string(),
            DiagnosticLevel::Warning => "warning".yellow().bold().to_string(),
        };
        eprintln!(
            "{}[{}]: {} ({})",
            level_str,
            diag.code.code().bright_black(),
            diag.message,
            diag.file.cyan()
        );
    } else {
        eprintln!("{diag}");
    }
}

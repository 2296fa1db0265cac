//! Whole-document consistency checks.
//!
//! Mutations already refuse to create invalid state; these checks catch what
//! hand edits and older documents may carry.

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::model::{
    Document, FREQUENCIES, IssueStatus, PipelineType, RECORD_STATUSES, Subsystem,
};
use crate::registry::{derive_counts, issue_number, parse_date, validate_record};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap_or_else(|_| unreachable!())
});

/// Validation result with diagnostics
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub group_count: usize,
    pub subsystem_count: usize,
    pub record_count: usize,
    pub issue_count: usize,
}

impl ValidationResult {
    fn push(&mut self, code: DiagnosticCode, message: impl Into<String>, at: &str) {
        self.diagnostics.push(Diagnostic::new(code, message, at));
    }
}

/// Validate the entire document
pub fn validate_document(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult {
        group_count: doc.groups.len(),
        ..Default::default()
    };

    let mut group_names = HashSet::new();
    for group in &doc.groups {
        if !group_names.insert(group.name.as_str()) {
            result.push(
                DiagnosticCode::E0102DuplicateGroup,
                format!("Duplicate group name: {}", group.name),
                &group.name,
            );
        }

        let mut sub_names = HashSet::new();
        for sub in &group.subsystems {
            let at = format!("{}/{}", group.name, sub.name);
            if !sub_names.insert(sub.name.as_str()) {
                result.push(
                    DiagnosticCode::E0103DuplicateSubsystem,
                    format!("Duplicate subsystem name: {}", sub.name),
                    &at,
                );
            }
            result.subsystem_count += 1;
            validate_records(sub, &at, &mut result);
            validate_issues(sub, &at, &mut result);
        }
    }

    result
}

fn validate_records(sub: &Subsystem, at: &str, result: &mut ValidationResult) {
    for pipeline_type in PipelineType::ALL {
        let records = sub.records(pipeline_type);
        result.record_count += records.len();

        // Counts are only derived once records exist; bare counts are legit.
        if !records.is_empty() && derive_counts(records) != *sub.pipelines.get(pipeline_type) {
            result.push(
                DiagnosticCode::W0102CountsOutOfSync,
                format!(
                    "Stored {} counts do not match pipelineDetails (run `pipeboard recompute`)",
                    pipeline_type.as_ref()
                ),
                at,
            );
        }

        for (i, record) in records.iter().enumerate() {
            let name = record.get("pipeline_name").unwrap_or("?");
            let loc = format!("{at}/{}[{i}]", pipeline_type.as_ref());

            if let Err(e) = validate_record(pipeline_type, record) {
                let code = match e {
                    crate::error::ValidationError::BadNumeric { .. } => {
                        DiagnosticCode::E0202BadNumeric
                    }
                    _ => DiagnosticCode::E0201MissingFields,
                };
                result.push(code, format!("{name}: {e}"), &loc);
            }

            let status = record.status();
            if !status.is_empty() && !RECORD_STATUSES.contains(&status) {
                result.push(
                    DiagnosticCode::W0103UnknownRecordStatus,
                    format!("{name}: unknown status '{status}' (counted as finalized)"),
                    &loc,
                );
            }

            let time_fields: &[&str] = match pipeline_type {
                PipelineType::Batch => &["run_timestamp"],
                PipelineType::Streaming => &["start_time", "end_time"],
            };
            for field in time_fields {
                if let Some(v) = record.get(field).filter(|v| !v.is_empty())
                    && !CLOCK_TIME.is_match(v)
                {
                    result.push(
                        DiagnosticCode::W0104BadTimeFormat,
                        format!("{name}: {field} '{v}' is not HH:MM"),
                        &loc,
                    );
                }
            }

            for field in ["uat_date", "prod_date"] {
                if let Some(v) = record.get(field).filter(|v| !v.is_empty())
                    && parse_date(v).is_none()
                {
                    result.push(
                        DiagnosticCode::W0105BadDateFormat,
                        format!("{name}: {field} '{v}' is not YYYY-MM-DD"),
                        &loc,
                    );
                }
            }

            if pipeline_type == PipelineType::Batch
                && let Some(freq) = record.get("frequency").filter(|v| !v.is_empty())
                && !FREQUENCIES.contains(&freq)
            {
                result.push(
                    DiagnosticCode::W0106UnknownFrequency,
                    format!("{name}: unknown frequency '{freq}'"),
                    &loc,
                );
            }
        }
    }
}

fn validate_issues(sub: &Subsystem, at: &str, result: &mut ValidationResult) {
    let mut ids = HashSet::new();
    for issue in &sub.issues {
        result.issue_count += 1;
        let loc = format!("{at}/{}", issue.id);

        if !ids.insert(issue.id.as_str()) {
            result.push(
                DiagnosticCode::E0206DuplicateIssue,
                format!("Duplicate issue id: {}", issue.id),
                &loc,
            );
        }
        if issue_number(&issue.id).is_none() {
            result.push(
                DiagnosticCode::W0108IssueIdFormat,
                format!("Issue id '{}' does not follow ISS-<n>", issue.id),
                &loc,
            );
        }

        let start = parse_date(&issue.start_date);
        if issue.start_date.is_empty() {
            result.push(
                DiagnosticCode::W0107IssueNoStartDate,
                "Issue has no start_date (blocked days read as 0)",
                &loc,
            );
        } else if start.is_none() {
            result.push(
                DiagnosticCode::E0204BadDate,
                format!("start_date '{}' is not YYYY-MM-DD", issue.start_date),
                &loc,
            );
        }

        match issue.close_date.as_deref() {
            Some(close) => match (start, parse_date(close)) {
                (_, None) => result.push(
                    DiagnosticCode::E0204BadDate,
                    format!("close_date '{close}' is not YYYY-MM-DD"),
                    &loc,
                ),
                (Some(s), Some(c)) if c < s => result.push(
                    DiagnosticCode::E0203BadDateRange,
                    format!("close_date {close} is before start_date {}", issue.start_date),
                    &loc,
                ),
                _ => {}
            },
            None if issue.status == IssueStatus::Closed => result.push(
                DiagnosticCode::E0207ClosedWithoutDate,
                "Closed issue has no close_date",
                &loc,
            ),
            None => {}
        }
    }
}

//! Issue commands.

use crate::cmd::{commit, located, open_session};
use crate::config::Config;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::RegistryError;
use crate::model::{Issue, IssueStatus};
use crate::registry::{format_date, parse_date, today};
use crate::store::WriteOp;
use crate::ui;
use chrono::NaiveDate;

/// Field changes for `issue set`; `None` keeps the current value
#[derive(Debug, Default)]
pub struct IssueChanges<'a> {
    pub description: Option<&'a str>,
    pub status: Option<IssueStatus>,
    pub start_date: Option<&'a str>,
    pub close_date: Option<&'a str>,
}

/// Open a new issue under the next unused id
pub fn new_issue(
    config: &Config,
    group: &str,
    subsystem: &str,
    description: &str,
    status: IssueStatus,
    start_date: Option<&str>,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;
    let start_date = start_date
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today()));

    let id = session
        .apply(|doc| {
            let sub = doc.find_subsystem_mut(group, subsystem)?;
            let id = sub.next_issue_id()?;
            sub.upsert_issue(Issue {
                id: id.clone(),
                description: description.to_string(),
                status,
                start_date,
                close_date: None,
            })?;
            Ok(id)
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::issue_saved(&id, status.as_ref());
    Ok(diags)
}

/// Update fields of an existing issue
pub fn set_issue(
    config: &Config,
    group: &str,
    subsystem: &str,
    id: &str,
    changes: &IssueChanges<'_>,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    let status = session
        .apply(|doc| {
            let sub = doc.find_subsystem_mut(group, subsystem)?;
            let mut issue = sub
                .find_issue(id)
                .cloned()
                .ok_or_else(|| RegistryError::IssueNotFound(id.to_string()))?;
            if let Some(description) = changes.description {
                issue.description = description.to_string();
            }
            if let Some(status) = changes.status {
                // Reopening drops the old close date unless a new one is given
                if issue.status == IssueStatus::Closed
                    && status != IssueStatus::Closed
                    && changes.close_date.is_none()
                {
                    issue.close_date = None;
                }
                issue.status = status;
            }
            if let Some(start) = changes.start_date {
                issue.start_date = start.to_string();
            }
            if let Some(close) = changes.close_date {
                // An empty value clears the close date
                issue.close_date = (!close.is_empty()).then(|| close.to_string());
            }
            let status = issue.status;
            sub.upsert_issue(issue)?;
            Ok(status)
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::issue_saved(id, status.as_ref());
    Ok(diags)
}

pub fn delete_issue(
    config: &Config,
    group: &str,
    subsystem: &str,
    id: &str,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    session
        .apply(|doc| doc.find_subsystem_mut(group, subsystem)?.delete_issue(id))
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::issue_deleted(id);
    Ok(diags)
}

/// Print how long each issue has been blocking, as of `as_of` (default today)
pub fn blocked(
    config: &Config,
    group: &str,
    subsystem: &str,
    as_of: Option<&str>,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let as_of: NaiveDate = match as_of {
        Some(value) => parse_date(value).ok_or_else(|| {
            Diagnostic::new(
                DiagnosticCode::E0204BadDate,
                format!("--as-of must be a YYYY-MM-DD date, got '{value}'"),
                format!("{group}/{subsystem}"),
            )
        })?,
        None => today(),
    };

    let mut diags = vec![];
    let session = open_session(config, op, &mut diags)?;
    let sub = session
        .doc()
        .find_subsystem(group, subsystem)
        .map_err(located(group, subsystem))?;

    for issue in &sub.issues {
        println!(
            "{}\t{}\t{}",
            issue.id,
            issue.status.as_ref(),
            issue.blocked_days(as_of)
        );
    }
    Ok(diags)
}

//! List command implementation.

use crate::ListTarget;
use crate::OutputFormat;
use crate::cmd::{located, open_session};
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::{ContactRole, Document, IssueStatus, PipelineRecord, PipelineType, StageRow};
use crate::registry::today;
use crate::store::WriteOp;
use crate::ui::stdout_supports_color;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

/// Check if stdout supports colors (delegates to centralized ui module)
fn use_colors() -> bool {
    stdout_supports_color()
}

/// Create an ID cell (cyan, bold when colors enabled)
fn id_cell(text: &str) -> Cell {
    if use_colors() {
        Cell::new(text)
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(text)
    }
}

/// Create a status cell with semantic color
fn status_cell(status: &str) -> Cell {
    if use_colors() {
        let color = match status {
            "Planned" | "Open" => Color::Yellow,
            "UAT" | "InProgress" => Color::Cyan,
            "PROD" | "Closed" => Color::Green,
            "Blocked" => Color::Red,
            _ => Color::White,
        };
        Cell::new(status).fg(color)
    } else {
        Cell::new(status)
    }
}

/// Create a header cell (bold when colors enabled)
fn header_cell(text: &str) -> Cell {
    if use_colors() {
        Cell::new(text).add_attribute(Attribute::Bold)
    } else {
        Cell::new(text)
    }
}

/// Row filters shared by every list target
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter<'a> {
    pub group: Option<&'a str>,
    pub subsystem: Option<&'a str>,
    pub pipeline_type: Option<PipelineType>,
    pub limit: Option<usize>,
}

impl ListFilter<'_> {
    fn matches(&self, group: &str, subsystem: &str) -> bool {
        self.group.is_none_or(|g| g == group) && self.subsystem.is_none_or(|s| s == subsystem)
    }

    fn matches_type(&self, pipeline_type: PipelineType) -> bool {
        self.pipeline_type.is_none_or(|t| t == pipeline_type)
    }

    fn truncate<T>(&self, items: &mut Vec<T>) {
        if let Some(n) = self.limit {
            items.truncate(n);
        }
    }
}

/// List registry contents
pub fn list(
    config: &Config,
    target: ListTarget,
    filter: ListFilter<'_>,
    output: OutputFormat,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let session = open_session(config, op, &mut diags)?;
    let doc = session.doc();

    if let (Some(g), Some(s)) = (filter.group, filter.subsystem) {
        doc.find_subsystem(g, s).map_err(located(g, s))?;
    } else if let Some(g) = filter.group {
        doc.find_group(g).map_err(|e| Diagnostic::from_registry(e, g))?;
    }

    match target {
        ListTarget::Groups => list_groups(doc, filter, output),
        ListTarget::Subsystems => list_subsystems(doc, filter, output),
        ListTarget::Stages => list_stages(doc, filter, output),
        ListTarget::Pipelines => list_pipelines(doc, filter, output),
        ListTarget::Issues => list_issues(doc, filter, output),
        ListTarget::Contacts => list_contacts(doc, filter, output),
    }

    Ok(diags)
}

/// Output a list of items in the specified format
fn output_list<T: Serialize>(
    items: &[T],
    headers: &[&str],
    format: OutputFormat,
    to_row: impl Fn(&T) -> Vec<String>,
) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Plain => {
            for item in items {
                let row = to_row(item);
                // Plain output: tab-separated values
                println!("{}", row.join("\t"));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());

            for item in items {
                let row = to_row(item);
                table.add_row(
                    row.iter()
                        .enumerate()
                        .map(|(i, v)| {
                            if i == 0 {
                                id_cell(v)
                            } else if headers.get(i).is_some_and(|h| *h == "Status") {
                                status_cell(v)
                            } else {
                                Cell::new(v)
                            }
                        })
                        .collect::<Vec<_>>(),
                );
            }

            println!("{table}");
        }
    }
}

#[derive(Serialize)]
struct GroupSummary {
    name: String,
    subsystems: usize,
}

fn list_groups(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let mut summaries: Vec<GroupSummary> = doc
        .groups
        .iter()
        .filter(|g| filter.group.is_none_or(|want| want == g.name))
        .map(|g| GroupSummary {
            name: g.name.clone(),
            subsystems: g.subsystems.len(),
        })
        .collect();
    filter.truncate(&mut summaries);

    output_list(&summaries, &["Group", "Subsystems"], output, |s| {
        vec![s.name.clone(), s.subsystems.to_string()]
    });
}

#[derive(Serialize)]
struct SubsystemSummary {
    group: String,
    subsystem: String,
    streaming: u64,
    batch: u64,
    records: usize,
    open_issues: usize,
}

fn list_subsystems(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let mut summaries: Vec<SubsystemSummary> = doc
        .iter_subsystems()
        .filter(|(g, sub)| filter.matches(g, &sub.name))
        .map(|(g, sub)| SubsystemSummary {
            group: g.to_string(),
            subsystem: sub.name.clone(),
            streaming: sub.pipelines.streaming.total(),
            batch: sub.pipelines.batch.total(),
            records: PipelineType::ALL
                .iter()
                .map(|t| sub.records(*t).len())
                .sum(),
            open_issues: sub
                .issues
                .iter()
                .filter(|i| i.status != IssueStatus::Closed)
                .count(),
        })
        .collect();
    filter.truncate(&mut summaries);

    output_list(
        &summaries,
        &["Subsystem", "Group", "Streaming", "Batch", "Records", "Open Issues"],
        output,
        |s| {
            vec![
                s.subsystem.clone(),
                s.group.clone(),
                s.streaming.to_string(),
                s.batch.to_string(),
                s.records.to_string(),
                s.open_issues.to_string(),
            ]
        },
    );
}

fn list_stages(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let mut rows: Vec<StageRow> = doc
        .stage_rows()
        .into_iter()
        .filter(|r| filter.matches(&r.group, &r.subsystem) && filter.matches_type(r.pipeline_type))
        .collect();
    filter.truncate(&mut rows);

    output_list(
        &rows,
        &["Group", "Subsystem", "Type", "Stage", "Count"],
        output,
        |r| {
            vec![
                r.group.clone(),
                r.subsystem.clone(),
                r.pipeline_type.as_ref().to_string(),
                r.stage.to_string(),
                r.count.to_string(),
            ]
        },
    );
}

#[derive(Serialize)]
struct PipelineSummary<'a> {
    index: usize,
    group: &'a str,
    subsystem: &'a str,
    #[serde(rename = "type")]
    pipeline_type: PipelineType,
    record: &'a PipelineRecord,
}

impl PipelineSummary<'_> {
    fn field(&self, name: &str) -> String {
        self.record.get(name).unwrap_or("").to_string()
    }
}

fn list_pipelines(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let mut summaries = Vec::new();
    for (group, sub) in doc.iter_subsystems() {
        if !filter.matches(group, &sub.name) {
            continue;
        }
        for pipeline_type in PipelineType::ALL {
            if !filter.matches_type(pipeline_type) {
                continue;
            }
            summaries.extend(sub.records(pipeline_type).iter().enumerate().map(
                |(index, record)| PipelineSummary {
                    index,
                    group,
                    subsystem: &sub.name,
                    pipeline_type,
                    record,
                },
            ));
        }
    }
    filter.truncate(&mut summaries);

    output_list(
        &summaries,
        &[
            "#", "Group", "Subsystem", "Type", "Pipeline", "Data", "Status", "UAT", "PROD",
        ],
        output,
        |s| {
            vec![
                s.index.to_string(),
                s.group.to_string(),
                s.subsystem.to_string(),
                s.pipeline_type.as_ref().to_string(),
                s.field("pipeline_name"),
                s.field("data_name"),
                s.field("status"),
                s.field("uat_date"),
                s.field("prod_date"),
            ]
        },
    );
}

#[derive(Serialize)]
struct IssueSummary {
    id: String,
    group: String,
    subsystem: String,
    status: IssueStatus,
    description: String,
    start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    close_date: Option<String>,
    blocked_days: i64,
}

fn list_issues(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let as_of = today();
    let mut summaries: Vec<IssueSummary> = doc
        .iter_subsystems()
        .filter(|(g, sub)| filter.matches(g, &sub.name))
        .flat_map(|(g, sub)| {
            sub.issues.iter().map(move |issue| IssueSummary {
                id: issue.id.clone(),
                group: g.to_string(),
                subsystem: sub.name.clone(),
                status: issue.status,
                description: issue.description.clone(),
                start_date: issue.start_date.clone(),
                close_date: issue.close_date.clone(),
                blocked_days: issue.blocked_days(as_of),
            })
        })
        .collect();
    filter.truncate(&mut summaries);

    output_list(
        &summaries,
        &[
            "ID",
            "Group",
            "Subsystem",
            "Status",
            "Start",
            "Close",
            "Blocked Days",
            "Description",
        ],
        output,
        |s| {
            vec![
                s.id.clone(),
                s.group.clone(),
                s.subsystem.clone(),
                s.status.as_ref().to_string(),
                s.start_date.clone(),
                s.close_date.clone().unwrap_or_default(),
                s.blocked_days.to_string(),
                s.description.clone(),
            ]
        },
    );
}

#[derive(Serialize)]
struct ContactSummary<'a> {
    group: &'a str,
    subsystem: &'a str,
    role: ContactRole,
    names: &'a [String],
}

fn list_contacts(doc: &Document, filter: ListFilter<'_>, output: OutputFormat) {
    let mut summaries = Vec::new();
    for (group, sub) in doc.iter_subsystems() {
        if !filter.matches(group, &sub.name) {
            continue;
        }
        summaries.extend(ContactRole::ALL.into_iter().map(|role| ContactSummary {
            group,
            subsystem: &sub.name,
            role,
            names: sub.contacts.get(role),
        }));
    }
    filter.truncate(&mut summaries);

    output_list(
        &summaries,
        &["Role", "Group", "Subsystem", "Names"],
        output,
        |s| {
            vec![
                s.role.label().to_string(),
                s.group.to_string(),
                s.subsystem.to_string(),
                s.names.join(", "),
            ]
        },
    );
}

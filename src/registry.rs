//! Query and mutation rules for the onboarding document.
//!
//! Every mutation validates first and only then touches the document, so a
//! rejected call leaves the tree exactly as it was.

use crate::error::{RegistryError, RegistryResult, ValidationError};
use crate::model::{
    Document, Group, Issue, IssueStatus, PipelineRecord, PipelineType, Stage, StageCounts,
    StageRow, Subsystem,
};
use chrono::{Local, NaiveDate};

/// Date format used throughout the document
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Issue numbers start above this floor
const ISSUE_NUMBER_FLOOR: u64 = 100;

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// =============================================================================
// Document-level operations
// =============================================================================

impl Document {
    /// Positions of `(group, subsystem)`. The first occurrence of a
    /// duplicated name wins.
    fn locate(&self, group: &str, subsystem: &str) -> RegistryResult<(usize, usize)> {
        let gi = self
            .groups
            .iter()
            .position(|g| g.name == group)
            .ok_or_else(|| RegistryError::GroupNotFound(group.to_string()))?;
        let si = self.groups[gi]
            .subsystems
            .iter()
            .position(|s| s.name == subsystem)
            .ok_or_else(|| RegistryError::SubsystemNotFound {
                group: group.to_string(),
                subsystem: subsystem.to_string(),
            })?;
        Ok((gi, si))
    }

    pub fn find_group(&self, group: &str) -> RegistryResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .ok_or_else(|| RegistryError::GroupNotFound(group.to_string()))
    }

    pub fn find_subsystem(&self, group: &str, subsystem: &str) -> RegistryResult<&Subsystem> {
        let (gi, si) = self.locate(group, subsystem)?;
        Ok(&self.groups[gi].subsystems[si])
    }

    pub fn find_subsystem_mut(
        &mut self,
        group: &str,
        subsystem: &str,
    ) -> RegistryResult<&mut Subsystem> {
        let (gi, si) = self.locate(group, subsystem)?;
        Ok(&mut self.groups[gi].subsystems[si])
    }

    pub fn add_group(&mut self, name: &str) -> RegistryResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingFields(vec!["name".to_string()]).into());
        }
        if self.groups.iter().any(|g| g.name == name) {
            return Err(RegistryError::DuplicateName {
                kind: "group",
                name: name.to_string(),
            });
        }
        self.groups.push(Group {
            name: name.to_string(),
            subsystems: vec![],
        });
        Ok(())
    }

    pub fn add_subsystem(&mut self, group: &str, name: &str) -> RegistryResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingFields(vec!["name".to_string()]).into());
        }
        let target = self
            .groups
            .iter_mut()
            .find(|g| g.name == group)
            .ok_or_else(|| RegistryError::GroupNotFound(group.to_string()))?;
        if target.subsystems.iter().any(|s| s.name == name) {
            return Err(RegistryError::DuplicateName {
                kind: "subsystem",
                name: format!("{group}/{name}"),
            });
        }
        target.subsystems.push(Subsystem::new(name));
        Ok(())
    }

    /// Iterate over every subsystem with its group name
    pub fn iter_subsystems(&self) -> impl Iterator<Item = (&str, &Subsystem)> {
        self.groups
            .iter()
            .flat_map(|g| g.subsystems.iter().map(move |s| (g.name.as_str(), s)))
    }

    /// Flattened (group, subsystem, type, stage) -> count projection
    pub fn stage_rows(&self) -> Vec<StageRow> {
        let mut rows = Vec::new();
        for (group, sub) in self.iter_subsystems() {
            for pipeline_type in PipelineType::ALL {
                let counts = sub.pipelines.get(pipeline_type);
                for stage in Stage::ALL {
                    rows.push(StageRow {
                        group: group.to_string(),
                        subsystem: sub.name.clone(),
                        pipeline_type,
                        stage_key: stage,
                        stage: stage.label(),
                        count: counts.get(stage),
                    });
                }
            }
        }
        rows
    }

    pub fn recompute_all(&mut self) {
        for group in &mut self.groups {
            for sub in &mut group.subsystems {
                sub.recompute_counts();
            }
        }
    }
}

// =============================================================================
// Pipeline records
// =============================================================================

/// Check a record carries every required field for its type and that the
/// numeric fields parse as non-negative decimals.
pub fn validate_record(
    pipeline_type: PipelineType,
    record: &PipelineRecord,
) -> Result<(), ValidationError> {
    let missing: Vec<String> = pipeline_type
        .required_fields()
        .iter()
        .filter(|f| record.get(f).is_none_or(|v| v.trim().is_empty()))
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    for field in pipeline_type.numeric_fields() {
        let value = record.get(field).unwrap_or_default();
        if !is_non_negative_decimal(value) {
            return Err(ValidationError::BadNumeric {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn is_non_negative_decimal(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n >= 0.0)
}

/// Derive stage counts from a record list
pub fn derive_counts(records: &[PipelineRecord]) -> StageCounts {
    let mut counts = StageCounts::default();
    for record in records {
        *counts.get_mut(Stage::for_record_status(record.status())) += 1;
    }
    counts
}

impl Subsystem {
    pub fn records(&self, pipeline_type: PipelineType) -> &[PipelineRecord] {
        self.pipeline_details.get(pipeline_type)
    }

    pub fn add_record(
        &mut self,
        pipeline_type: PipelineType,
        record: PipelineRecord,
    ) -> RegistryResult<()> {
        validate_record(pipeline_type, &record)?;
        self.pipeline_details.get_mut(pipeline_type).push(record);
        self.recompute_counts();
        Ok(())
    }

    /// Append imported records as-is; blank cells stay empty strings.
    /// Column coverage is checked by the importer.
    pub fn import_records(
        &mut self,
        pipeline_type: PipelineType,
        records: Vec<PipelineRecord>,
    ) -> usize {
        let added = records.len();
        self.pipeline_details
            .get_mut(pipeline_type)
            .extend(records);
        self.recompute_counts();
        added
    }

    pub fn update_record(
        &mut self,
        pipeline_type: PipelineType,
        index: usize,
        record: PipelineRecord,
    ) -> RegistryResult<()> {
        self.check_index(pipeline_type, index)?;
        validate_record(pipeline_type, &record)?;
        self.pipeline_details.get_mut(pipeline_type)[index] = record;
        self.recompute_counts();
        Ok(())
    }

    pub fn delete_record(
        &mut self,
        pipeline_type: PipelineType,
        index: usize,
    ) -> RegistryResult<PipelineRecord> {
        self.check_index(pipeline_type, index)?;
        let removed = self.pipeline_details.get_mut(pipeline_type).remove(index);
        self.recompute_counts();
        Ok(removed)
    }

    fn check_index(&self, pipeline_type: PipelineType, index: usize) -> RegistryResult<()> {
        let len = self.records(pipeline_type).len();
        if index >= len {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len,
                pipeline_type,
            });
        }
        Ok(())
    }

    /// Overwrite both types' stage counts from the record lists
    pub fn recompute_counts(&mut self) {
        for pipeline_type in PipelineType::ALL {
            *self.pipelines.get_mut(pipeline_type) = derive_counts(self.records(pipeline_type));
        }
    }

    /// Stage counts summed across pipeline types
    pub fn stage_totals(&self) -> StageCounts {
        let mut totals = StageCounts::default();
        for pipeline_type in PipelineType::ALL {
            let counts = self.pipelines.get(pipeline_type);
            for stage in Stage::ALL {
                let total = totals.get_mut(stage);
                *total = total.saturating_add(counts.get(stage));
            }
        }
        totals
    }
}

// =============================================================================
// Issues
// =============================================================================

/// Numeric part of an `ISS-<n>` identifier
pub fn issue_number(id: &str) -> Option<u64> {
    id.strip_prefix("ISS-")?.parse().ok()
}

impl Issue {
    /// Days the issue has been blocking: `(close_date or as_of) - start_date`,
    /// never negative. An unparsable start date yields 0.
    pub fn blocked_days(&self, as_of: NaiveDate) -> i64 {
        let Some(start) = parse_date(&self.start_date) else {
            return 0;
        };
        let end = self
            .close_date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(as_of);
        (end - start).num_days().max(0)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["id".to_string()]));
        }
        if self.start_date.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec![
                "start_date".to_string(),
            ]));
        }
        let start = parse_date(&self.start_date).ok_or_else(|| ValidationError::BadDate {
            field: "start_date".to_string(),
            value: self.start_date.clone(),
        })?;
        if let Some(close) = &self.close_date {
            let close_date = parse_date(close).ok_or_else(|| ValidationError::BadDate {
                field: "close_date".to_string(),
                value: close.clone(),
            })?;
            if close_date < start {
                return Err(ValidationError::BadDateRange {
                    start: self.start_date.clone(),
                    close: close.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Subsystem {
    pub fn find_issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    /// Next unused issue identifier. Numbers only ever grow, so an id freed
    /// by a deletion is never handed out again.
    pub fn next_issue_id(&self) -> RegistryResult<String> {
        let highest = self
            .issues
            .iter()
            .filter_map(|i| issue_number(&i.id))
            .chain([self.issue_seq, ISSUE_NUMBER_FLOOR])
            .max()
            .unwrap_or(ISSUE_NUMBER_FLOOR);
        let next = highest
            .checked_add(1)
            .ok_or(RegistryError::IssueIdsExhausted(highest))?;
        Ok(format!("ISS-{next}"))
    }

    /// Replace the issue with the same id, or append it.
    pub fn upsert_issue(&mut self, issue: Issue) -> RegistryResult<()> {
        self.upsert_issue_as_of(issue, today())
    }

    /// Like [`Subsystem::upsert_issue`] with an explicit "today" used when a
    /// closed issue needs its close date filled in.
    pub fn upsert_issue_as_of(&mut self, mut issue: Issue, today: NaiveDate) -> RegistryResult<()> {
        if issue.status == IssueStatus::Closed && issue.close_date.is_none() {
            issue.close_date = Some(format_date(today));
        }
        issue.validate()?;

        if let Some(n) = issue_number(&issue.id) {
            self.issue_seq = self.issue_seq.max(n);
        }
        match self.issues.iter_mut().find(|i| i.id == issue.id) {
            Some(existing) => *existing = issue,
            None => self.issues.push(issue),
        }
        Ok(())
    }

    pub fn delete_issue(&mut self, id: &str) -> RegistryResult<Issue> {
        let pos = self
            .issues
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| RegistryError::IssueNotFound(id.to_string()))?;
        if let Some(n) = issue_number(id) {
            self.issue_seq = self.issue_seq.max(n);
        }
        Ok(self.issues.remove(pos))
    }
}

//! Data models for the pipeline onboarding document.

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use strum::AsRefStr;

// =============================================================================
// Document Tree (JSON SSOT)
// =============================================================================

/// Root of the backing JSON document (data.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "Level1Groups")]
    pub groups: Vec<Group>,
}

/// Level-1 organizational group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub subsystems: Vec<Subsystem>,
}

/// Subsystem within a group: counts, contacts, issues and onboarding records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsystem {
    pub name: String,
    #[serde(default)]
    pub pipelines: Pipelines,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "PipelineDetails::is_empty")]
    pub pipeline_details: PipelineDetails,
    /// Highest issue number ever handed out in this subsystem
    #[serde(default, skip_serializing_if = "is_zero")]
    pub issue_seq: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Subsystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipelines: Pipelines::default(),
            contacts: Contacts::default(),
            issues: vec![],
            pipeline_details: PipelineDetails::default(),
            issue_seq: 0,
        }
    }
}

// =============================================================================
// Pipeline Types and Stages
// =============================================================================

/// Pipeline delivery type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsRefStr, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PipelineType {
    Batch,
    Streaming,
}

impl PipelineType {
    pub const ALL: [PipelineType; 2] = [PipelineType::Streaming, PipelineType::Batch];

    /// Fields every record of this type must carry (non-empty)
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Batch => &[
                "pipeline_name",
                "data_name",
                "frequency",
                "run_day",
                "run_timestamp",
                "file_size",
                "uat_date",
                "prod_date",
                "status",
                "comment",
            ],
            Self::Streaming => &[
                "pipeline_name",
                "data_name",
                "start_time",
                "end_time",
                "run_day",
                "rough_volume",
                "uat_date",
                "prod_date",
                "status",
                "comment",
            ],
        }
    }

    /// Fields that must parse as non-negative decimals
    pub fn numeric_fields(self) -> &'static [&'static str] {
        match self {
            Self::Batch => &["file_size"],
            Self::Streaming => &["rough_volume"],
        }
    }
}

/// Pipeline maturity bucket used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Finalized,
    Uat,
    Planned,
    Production,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Finalized, Stage::Uat, Stage::Planned, Stage::Production];

    /// Human-facing label
    pub fn label(self) -> &'static str {
        match self {
            Self::Finalized => "Finalized",
            Self::Uat => "UAT",
            Self::Planned => "Planned",
            Self::Production => "Production",
        }
    }

    /// Bucket a record status falls into. Unknown statuses (including
    /// `Blocked`) count as finalized.
    pub fn for_record_status(status: &str) -> Self {
        match status {
            "UAT" => Self::Uat,
            "PROD" => Self::Production,
            "Planned" => Self::Planned,
            _ => Self::Finalized,
        }
    }
}

/// Record statuses recognized by the stage mapping
pub const RECORD_STATUSES: [&str; 4] = ["Planned", "UAT", "PROD", "Blocked"];

/// Batch run frequencies
pub const FREQUENCIES: [&str; 3] = ["daily", "weekly", "monthly"];

/// Per-stage pipeline counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    #[serde(default, deserialize_with = "nullable_count")]
    pub finalized: u64,
    #[serde(default, deserialize_with = "nullable_count")]
    pub uat: u64,
    #[serde(default, deserialize_with = "nullable_count")]
    pub planned: u64,
    #[serde(default, deserialize_with = "nullable_count")]
    pub production: u64,
}

/// Hand-edited documents sometimes carry `null` counts; treat them as zero.
fn nullable_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

impl StageCounts {
    pub fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Finalized => self.finalized,
            Stage::Uat => self.uat,
            Stage::Planned => self.planned,
            Stage::Production => self.production,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut u64 {
        match stage {
            Stage::Finalized => &mut self.finalized,
            Stage::Uat => &mut self.uat,
            Stage::Planned => &mut self.planned,
            Stage::Production => &mut self.production,
        }
    }

    /// Sum of all stages, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.finalized
            .saturating_add(self.uat)
            .saturating_add(self.planned)
            .saturating_add(self.production)
    }
}

/// Stage counts keyed by pipeline type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipelines {
    #[serde(default)]
    pub streaming: StageCounts,
    #[serde(default)]
    pub batch: StageCounts,
}

impl Pipelines {
    pub fn get(&self, pipeline_type: PipelineType) -> &StageCounts {
        match pipeline_type {
            PipelineType::Batch => &self.batch,
            PipelineType::Streaming => &self.streaming,
        }
    }

    pub fn get_mut(&mut self, pipeline_type: PipelineType) -> &mut StageCounts {
        match pipeline_type {
            PipelineType::Batch => &mut self.batch,
            PipelineType::Streaming => &mut self.streaming,
        }
    }
}

// =============================================================================
// Pipeline Records
// =============================================================================

/// One onboarding entry; a flat string map whose required keys depend on
/// the pipeline type. Keys are kept sorted so saves are diff-friendly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineRecord(BTreeMap<String, String>);

impl PipelineRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Record status, empty when unset
    pub fn status(&self) -> &str {
        self.get("status").unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay every field of `other` onto this record
    pub fn merge(&mut self, other: &PipelineRecord) {
        for (k, v) in other.fields() {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PipelineRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Onboarding records keyed by pipeline type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDetails {
    #[serde(default)]
    pub batch: Vec<PipelineRecord>,
    #[serde(default)]
    pub streaming: Vec<PipelineRecord>,
}

impl PipelineDetails {
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.streaming.is_empty()
    }

    pub fn get(&self, pipeline_type: PipelineType) -> &[PipelineRecord] {
        match pipeline_type {
            PipelineType::Batch => &self.batch,
            PipelineType::Streaming => &self.streaming,
        }
    }

    pub fn get_mut(&mut self, pipeline_type: PipelineType) -> &mut Vec<PipelineRecord> {
        match pipeline_type {
            PipelineType::Batch => &mut self.batch,
            PipelineType::Streaming => &mut self.streaming,
        }
    }
}

// =============================================================================
// Contacts
// =============================================================================

/// Contact role on either side of an onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, ValueEnum)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum ContactRole {
    ProducerTech,
    ProducerBusiness,
    OurTech,
    OurBusiness,
}

impl ContactRole {
    pub const ALL: [ContactRole; 4] = [
        ContactRole::ProducerTech,
        ContactRole::ProducerBusiness,
        ContactRole::OurTech,
        ContactRole::OurBusiness,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ProducerTech => "Producer Tech",
            Self::ProducerBusiness => "Producer Business",
            Self::OurTech => "Our Tech",
            Self::OurBusiness => "Our Business/PMO",
        }
    }
}

/// Named people per contact role, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contacts {
    #[serde(default)]
    pub producer_tech: Vec<String>,
    #[serde(default)]
    pub producer_business: Vec<String>,
    #[serde(default)]
    pub our_tech: Vec<String>,
    #[serde(default)]
    pub our_business: Vec<String>,
}

impl Contacts {
    pub fn get(&self, role: ContactRole) -> &[String] {
        match role {
            ContactRole::ProducerTech => &self.producer_tech,
            ContactRole::ProducerBusiness => &self.producer_business,
            ContactRole::OurTech => &self.our_tech,
            ContactRole::OurBusiness => &self.our_business,
        }
    }

    /// Replace the names for a role wholesale
    pub fn set(&mut self, role: ContactRole, names: Vec<String>) {
        let slot = match role {
            ContactRole::ProducerTech => &mut self.producer_tech,
            ContactRole::ProducerBusiness => &mut self.producer_business,
            ContactRole::OurTech => &mut self.our_tech,
            ContactRole::OurBusiness => &mut self.our_business,
        };
        *slot = names;
    }
}

// =============================================================================
// Issues
// =============================================================================

/// Issue lifecycle; any status may move to any other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsRefStr, ValueEnum)]
pub enum IssueStatus {
    #[default]
    Open,
    #[serde(alias = "In Progress")]
    InProgress,
    Closed,
}

/// Obstacle blocking a subsystem's onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: IssueStatus,
    /// ISO date; older documents may leave it empty
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<String>,
}

// =============================================================================
// Projections
// =============================================================================

/// One row of the flattened stage projection used for charting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StageRow {
    pub group: String,
    pub subsystem: String,
    pub pipeline_type: PipelineType,
    pub stage_key: Stage,
    pub stage: &'static str,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(Stage::for_record_status("UAT"), Stage::Uat);
        assert_eq!(Stage::for_record_status("PROD"), Stage::Production);
        assert_eq!(Stage::for_record_status("Planned"), Stage::Planned);
        assert_eq!(Stage::for_record_status("Blocked"), Stage::Finalized);
        assert_eq!(Stage::for_record_status(""), Stage::Finalized);
        // Case sensitive, like the source statuses
        assert_eq!(Stage::for_record_status("uat"), Stage::Finalized);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let doc: Document = serde_json::from_str(
            r#"{"Level1Groups": [{"name": "G", "subsystems": [{"name": "S"}]}]}"#,
        )
        .unwrap();
        let sub = &doc.groups[0].subsystems[0];
        assert!(sub.issues.is_empty());
        assert!(sub.pipeline_details.is_empty());
        assert!(sub.contacts.get(ContactRole::OurTech).is_empty());
        assert_eq!(sub.pipelines.batch.total(), 0);
    }

    #[test]
    fn test_null_counts_read_as_zero() {
        let counts: StageCounts =
            serde_json::from_str(r#"{"finalized": null, "uat": 2}"#).unwrap();
        assert_eq!(counts.finalized, 0);
        assert_eq!(counts.uat, 2);
        assert_eq!(counts.production, 0);
    }

    #[test]
    fn test_negative_count_rejected() {
        let result: Result<StageCounts, _> = serde_json::from_str(r#"{"uat": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_in_progress_status() {
        let issue: Issue = serde_json::from_str(
            r#"{"id": "ISS-102", "description": "Schema mismatch", "status": "In Progress"}"#,
        )
        .unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(issue.start_date, "");

        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains(r#""status":"InProgress""#));
        assert!(!json.contains("close_date"));
    }

    #[test]
    fn test_contact_role_keys() {
        let json = serde_json::to_value(Contacts {
            producer_tech: vec!["Alice".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["producerTech"][0], "Alice");
        assert!(json["ourBusiness"].as_array().unwrap().is_empty());
        assert_eq!(ContactRole::OurBusiness.as_ref(), "ourBusiness");
    }

    #[test]
    fn test_record_keys_sorted() {
        let record: PipelineRecord = [("status", "UAT"), ("comment", "x"), ("data_name", "d")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"comment":"x","data_name":"d","status":"UAT"}"#);
    }
}

//! Registry error types.

use crate::model::PipelineType;
use std::path::PathBuf;
use thiserror::Error;

/// A rejected mutation. The document is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("field '{field}' must be a non-negative decimal, got '{value}'")]
    BadNumeric { field: String, value: String },
    #[error("close date {close} is before start date {start}")]
    BadDateRange { start: String, close: String },
    #[error("field '{field}' must be a YYYY-MM-DD date, got '{value}'")]
    BadDate { field: String, value: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("index {index} out of range for {len} {} record(s)", .pipeline_type.as_ref())]
    IndexOutOfRange {
        index: usize,
        len: usize,
        pipeline_type: PipelineType,
    },
    #[error("failed to save {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("subsystem not found: {group}/{subsystem}")]
    SubsystemNotFound { group: String, subsystem: String },
    #[error("issue not found: {0}")]
    IssueNotFound(String),
    #[error("no issue number left after ISS-{0}")]
    IssueIdsExhausted(u64),
    #[error("{kind} already exists: {name}")]
    DuplicateName { kind: &'static str, name: String },
}

impl RegistryError {
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

//! Diagnostic codes and error reporting.

use crate::error::{RegistryError, ValidationError};
use crate::import::ImportError;
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// Diagnostic error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    // Document errors (E01xx)
    E0101DocumentMalformed,
    E0102DuplicateGroup,
    E0103DuplicateSubsystem,

    // Validation errors (E02xx)
    E0201MissingFields,
    E0202BadNumeric,
    E0203BadDateRange,
    E0204BadDate,
    E0205IndexOutOfRange,
    E0206DuplicateIssue,
    E0207ClosedWithoutDate,

    // Lookup errors (E03xx)
    E0301GroupNotFound,
    E0302SubsystemNotFound,
    E0303IssueNotFound,
    E0304DuplicateName,
    E0305IssueIdsExhausted,

    // Import errors (E04xx)
    E0401ImportOpenFailed,
    E0402ImportEmpty,
    E0403ImportMissingColumns,

    // General errors (E09xx)
    E0901IoError,

    // Warnings (W01xx)
    W0101DocumentFallback,
    W0102CountsOutOfSync,
    W0103UnknownRecordStatus,
    W0104BadTimeFormat,
    W0105BadDateFormat,
    W0106UnknownFrequency,
    W0107IssueNoStartDate,
    W0108IssueIdFormat,
}

impl DiagnosticCode {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Self::W0101DocumentFallback
            | Self::W0102CountsOutOfSync
            | Self::W0103UnknownRecordStatus
            | Self::W0104BadTimeFormat
            | Self::W0105BadDateFormat
            | Self::W0106UnknownFrequency
            | Self::W0107IssueNoStartDate
            | Self::W0108IssueIdFormat => DiagnosticLevel::Warning,
            _ => DiagnosticLevel::Error,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            // E01xx - Document
            Self::E0101DocumentMalformed => "E0101",
            Self::E0102DuplicateGroup => "E0102",
            Self::E0103DuplicateSubsystem => "E0103",
            // E02xx - Validation
            Self::E0201MissingFields => "E0201",
            Self::E0202BadNumeric => "E0202",
            Self::E0203BadDateRange => "E0203",
            Self::E0204BadDate => "E0204",
            Self::E0205IndexOutOfRange => "E0205",
            Self::E0206DuplicateIssue => "E0206",
            Self::E0207ClosedWithoutDate => "E0207",
            // E03xx - Lookup
            Self::E0301GroupNotFound => "E0301",
            Self::E0302SubsystemNotFound => "E0302",
            Self::E0303IssueNotFound => "E0303",
            Self::E0304DuplicateName => "E0304",
            Self::E0305IssueIdsExhausted => "E0305",
            // E04xx - Import
            Self::E0401ImportOpenFailed => "E0401",
            Self::E0402ImportEmpty => "E0402",
            Self::E0403ImportMissingColumns => "E0403",
            // E09xx - General
            Self::E0901IoError => "E0901",
            // W01xx - Warnings
            Self::W0101DocumentFallback => "W0101",
            Self::W0102CountsOutOfSync => "W0102",
            Self::W0103UnknownRecordStatus => "W0103",
            Self::W0104BadTimeFormat => "W0104",
            Self::W0105BadDateFormat => "W0105",
            Self::W0106UnknownFrequency => "W0106",
            Self::W0107IssueNoStartDate => "W0107",
            Self::W0108IssueIdFormat => "W0108",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// Where the problem lives (file, or group/subsystem path)
    pub file: String,
    pub level: DiagnosticLevel,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            level: code.level(),
            code,
            message: message.into(),
            file: file.into(),
        }
    }

    /// Build from a registry error, located at `file`
    pub fn from_registry(err: RegistryError, file: impl Into<String>) -> Self {
        let code = match &err {
            RegistryError::MalformedDocument(_) => DiagnosticCode::E0101DocumentMalformed,
            RegistryError::Validation(v) => validation_code(v),
            RegistryError::IndexOutOfRange { .. } => DiagnosticCode::E0205IndexOutOfRange,
            RegistryError::Persist { .. } => DiagnosticCode::E0901IoError,
            RegistryError::GroupNotFound(_) => DiagnosticCode::E0301GroupNotFound,
            RegistryError::SubsystemNotFound { .. } => DiagnosticCode::E0302SubsystemNotFound,
            RegistryError::IssueNotFound(_) => DiagnosticCode::E0303IssueNotFound,
            RegistryError::DuplicateName { .. } => DiagnosticCode::E0304DuplicateName,
            RegistryError::IssueIdsExhausted(_) => DiagnosticCode::E0305IssueIdsExhausted,
        };
        Self::new(code, err.to_string(), file)
    }
}

fn validation_code(err: &ValidationError) -> DiagnosticCode {
    match err {
        ValidationError::MissingFields(_) => DiagnosticCode::E0201MissingFields,
        ValidationError::BadNumeric { .. } => DiagnosticCode::E0202BadNumeric,
        ValidationError::BadDateRange { .. } => DiagnosticCode::E0203BadDateRange,
        ValidationError::BadDate { .. } => DiagnosticCode::E0204BadDate,
    }
}

impl From<ImportError> for Diagnostic {
    fn from(err: ImportError) -> Self {
        let code = match &err {
            ImportError::Open { .. } | ImportError::NoWorksheet { .. } => {
                DiagnosticCode::E0401ImportOpenFailed
            }
            ImportError::Empty { .. } => DiagnosticCode::E0402ImportEmpty,
            ImportError::MissingColumns { .. } => DiagnosticCode::E0403ImportMissingColumns,
        };
        let file = err.file().to_string();
        Self::new(code, err.to_string(), file)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        };
        write!(
            f,
            "{}[{}]: {} ({})",
            level_str,
            self.code.code(),
            self.message,
            self.file
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_codes() {
        let diag = Diagnostic::from_registry(
            ValidationError::BadNumeric {
                field: "file_size".into(),
                value: "abc".into(),
            }
            .into(),
            "GroupA/SubsystemX",
        );
        assert_eq!(diag.code.code(), "E0202");
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(
            diag.to_string(),
            "error[E0202]: field 'file_size' must be a non-negative decimal, got 'abc' (GroupA/SubsystemX)"
        );
    }

    #[test]
    fn test_warning_level() {
        let diag = Diagnostic::new(DiagnosticCode::W0102CountsOutOfSync, "stale", "G/S");
        assert_eq!(diag.level, DiagnosticLevel::Warning);
        assert!(diag.to_string().starts_with("warning[W0102]"));
    }
}

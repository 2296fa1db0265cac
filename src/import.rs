//! Spreadsheet bulk import of pipeline records.
//!
//! The first worksheet is read; its first non-empty row is the header. The
//! header must name every required field for the chosen pipeline type. Each
//! following row becomes one record, with blank or error cells read as empty
//! strings. Cell contents are not validated.

use crate::model::{PipelineRecord, PipelineType};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to open spreadsheet: {source}")]
    Open {
        file: String,
        #[source]
        source: calamine::Error,
    },
    #[error("spreadsheet has no worksheets")]
    NoWorksheet { file: String },
    #[error("spreadsheet has no data rows")]
    Empty { file: String },
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { file: String, missing: Vec<String> },
}

impl ImportError {
    pub fn file(&self) -> &str {
        match self {
            Self::Open { file, .. }
            | Self::NoWorksheet { file }
            | Self::Empty { file }
            | Self::MissingColumns { file, .. } => file,
        }
    }
}

/// Read every record from the first worksheet of `path`
pub fn read_records(
    path: &Path,
    pipeline_type: PipelineType,
) -> Result<Vec<PipelineRecord>, ImportError> {
    let file = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|source| ImportError::Open {
        file: file.clone(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::NoWorksheet { file: file.clone() })?
        .map_err(|source| ImportError::Open {
            file: file.clone(),
            source,
        })?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    tracing::debug!(file = %file, rows = rows.len(), "read worksheet");
    records_from_rows(&file, &rows, pipeline_type)
}

/// Turn a header row plus data rows into records
pub fn records_from_rows(
    file: &str,
    rows: &[Vec<String>],
    pipeline_type: PipelineType,
) -> Result<Vec<PipelineRecord>, ImportError> {
    let mut numbered = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|c| !c.is_empty()));

    let Some((_, header)) = numbered.next() else {
        return Err(ImportError::Empty {
            file: file.to_string(),
        });
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    let missing: Vec<String> = pipeline_type
        .required_fields()
        .iter()
        .filter(|f| !header.iter().any(|h| h == *f))
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            file: file.to_string(),
            missing,
        });
    }

    let records: Vec<PipelineRecord> = numbered
        .map(|(_, row)| {
            header
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(col, name)| (name.clone(), row.get(col).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();

    if records.is_empty() {
        return Err(ImportError::Empty {
            file: file.to_string(),
        });
    }
    Ok(records)
}

/// Render a cell the way it reads in the sheet
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => {
                let epoch = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
                if ndt.date() <= epoch {
                    // Time-only cell
                    ndt.format("%H:%M").to_string()
                } else if ndt.time() == chrono::NaiveTime::MIN {
                    ndt.format("%Y-%m-%d").to_string()
                } else {
                    ndt.format("%Y-%m-%d %H:%M").to_string()
                }
            }
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

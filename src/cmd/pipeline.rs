//! Pipeline record commands: add, edit, delete, import, recompute.

use crate::cmd::{commit, located, open_session};
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::error::RegistryError;
use crate::import::read_records;
use crate::model::{PipelineRecord, PipelineType};
use crate::store::WriteOp;
use crate::ui;
use std::path::Path;

/// Parse a `key=value` field assignment
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn to_record(fields: &[(String, String)]) -> PipelineRecord {
    fields.iter().cloned().collect()
}

pub fn add(
    config: &Config,
    group: &str,
    subsystem: &str,
    pipeline_type: PipelineType,
    fields: &[(String, String)],
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;
    let record = to_record(fields);

    let index = session
        .apply(|doc| {
            let sub = doc.find_subsystem_mut(group, subsystem)?;
            sub.add_record(pipeline_type, record)?;
            Ok(sub.records(pipeline_type).len() - 1)
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::record_changed("Added", pipeline_type.as_ref(), index, group, subsystem);
    Ok(diags)
}

/// Merge `fields` into the record at `index`; untouched fields keep their values
pub fn edit(
    config: &Config,
    group: &str,
    subsystem: &str,
    pipeline_type: PipelineType,
    index: usize,
    fields: &[(String, String)],
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;
    let changes = to_record(fields);

    session
        .apply(|doc| {
            let sub = doc.find_subsystem_mut(group, subsystem)?;
            let mut record = sub
                .records(pipeline_type)
                .get(index)
                .cloned()
                .ok_or(RegistryError::IndexOutOfRange {
                    index,
                    len: sub.records(pipeline_type).len(),
                    pipeline_type,
                })?;
            record.merge(&changes);
            sub.update_record(pipeline_type, index, record)
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::record_changed("Updated", pipeline_type.as_ref(), index, group, subsystem);
    Ok(diags)
}

pub fn delete(
    config: &Config,
    group: &str,
    subsystem: &str,
    pipeline_type: PipelineType,
    index: usize,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    let removed = session
        .apply(|doc| {
            doc.find_subsystem_mut(group, subsystem)?
                .delete_record(pipeline_type, index)
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::record_changed("Deleted", pipeline_type.as_ref(), index, group, subsystem);
    if let Some(name) = removed.get("pipeline_name") {
        ui::info(format!("  was: {name}"));
    }
    Ok(diags)
}

/// Bulk-add records from a spreadsheet. Nothing is added unless the header
/// names every required column and at least one data row exists.
pub fn import(
    config: &Config,
    group: &str,
    subsystem: &str,
    pipeline_type: PipelineType,
    file: &Path,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;
    session
        .doc()
        .find_subsystem(group, subsystem)
        .map_err(located(group, subsystem))?;

    let records = read_records(file, pipeline_type).map_err(Diagnostic::from)?;

    let added = session
        .apply(|doc| {
            Ok(doc
                .find_subsystem_mut(group, subsystem)?
                .import_records(pipeline_type, records))
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::imported(added, pipeline_type.as_ref(), group, subsystem);
    Ok(diags)
}

/// Rederive every subsystem's stage counts from its records
pub fn recompute(config: &Config, op: WriteOp) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    session
        .apply(|doc| {
            doc.recompute_all();
            Ok(())
        })
        .map_err(|e| Diagnostic::from_registry(e, config.data_path().display().to_string()))?;
    commit(&mut session, op)?;

    for (group, sub) in session.doc().iter_subsystems() {
        ui::info(ui::location_str(group, &sub.name));
        for pipeline_type in PipelineType::ALL {
            ui::counts_line(pipeline_type.as_ref(), sub.pipelines.get(pipeline_type));
        }
    }
    Ok(diags)
}

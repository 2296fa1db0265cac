//! Group and subsystem creation.

use crate::cmd::{commit, open_session};
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::store::WriteOp;
use crate::ui;

pub fn add_group(config: &Config, name: &str, op: WriteOp) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    session
        .apply(|doc| doc.add_group(name))
        .map_err(|e| Diagnostic::from_registry(e, name))?;

    commit(&mut session, op)?;
    ui::success(format!("Added group {}", name.trim()));
    Ok(diags)
}

pub fn add_subsystem(
    config: &Config,
    group: &str,
    name: &str,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;

    session
        .apply(|doc| doc.add_subsystem(group, name))
        .map_err(|e| Diagnostic::from_registry(e, group))?;

    commit(&mut session, op)?;
    ui::success(format!("Added subsystem {}", ui::location_str(group, name.trim())));
    Ok(diags)
}

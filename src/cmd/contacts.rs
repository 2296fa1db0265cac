//! Contact roster command.

use crate::cmd::{commit, located, open_session};
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::ContactRole;
use crate::store::WriteOp;
use crate::ui;

/// Replace the names for one role. Blank names are dropped.
pub fn set_contacts(
    config: &Config,
    group: &str,
    subsystem: &str,
    role: ContactRole,
    names: &[String],
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let mut session = open_session(config, op, &mut diags)?;
    let names: Vec<String> = names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    session
        .apply(|doc| {
            doc.find_subsystem_mut(group, subsystem)?
                .contacts
                .set(role, names.clone());
            Ok(())
        })
        .map_err(located(group, subsystem))?;

    commit(&mut session, op)?;
    ui::contacts_set(role.as_ref(), &names);
    Ok(diags)
}

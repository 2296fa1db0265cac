//! Full-document JSON export.

use crate::cmd::open_session;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::store::{WriteOp, serialize_document};
use crate::ui;
use anyhow::Context;
use std::path::Path;

/// Write the document as pretty JSON to `output`, or stdout when absent
pub fn export(
    config: &Config,
    output: Option<&Path>,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let session = open_session(config, op, &mut diags)?;
    let json = serialize_document(session.doc());

    match output {
        None => print!("{json}"),
        Some(path) if op.is_preview() => {
            println!("[dry-run] Would write: {}", path.display());
        }
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ui::created("export", path);
        }
    }
    Ok(diags)
}

//! Command implementations.

pub mod check;
pub mod contacts;
pub mod export;
pub mod init;
pub mod issue;
pub mod list;
pub mod pipeline;
pub mod status;
pub mod structure;

use crate::config::Config;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::RegistryError;
use crate::store::{Origin, Session, WriteOp};
use crate::ui;

/// Open the configured document. A fallback to the built-in default is
/// reported as a warning diagnostic.
pub(crate) fn open_session(
    config: &Config,
    op: WriteOp,
    diags: &mut Vec<Diagnostic>,
) -> anyhow::Result<Session> {
    let path = config.data_path();
    let session = Session::open(&path, op)
        .map_err(|e| Diagnostic::from_registry(e, path.display().to_string()))?;

    match session.origin() {
        Origin::Loaded => {}
        Origin::Seeded => {
            if !op.is_preview() {
                ui::created("data file", &path);
            }
        }
        Origin::Fallback(reason) => diags.push(Diagnostic::new(
            DiagnosticCode::W0101DocumentFallback,
            format!("Using built-in default document, file left untouched: {reason}"),
            path.display().to_string(),
        )),
    }
    Ok(session)
}

/// Locate registry failures at `group/subsystem`
pub(crate) fn located(group: &str, subsystem: &str) -> impl Fn(RegistryError) -> Diagnostic {
    let at = format!("{group}/{subsystem}");
    move |e| Diagnostic::from_registry(e, at.clone())
}

/// Persist pending changes, reporting the saved path
pub(crate) fn commit(session: &mut Session, op: WriteOp) -> anyhow::Result<()> {
    let path = session.path().display().to_string();
    tracing::debug!(path = %path, dirty = session.is_dirty(), ?op, "commit");
    let written = session
        .commit(op)
        .map_err(|e| Diagnostic::from_registry(e, path))?;
    if written {
        ui::saved(session.path());
    }
    Ok(())
}

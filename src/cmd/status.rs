//! Status command implementation.

use crate::cmd::{located, open_session};
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::{ContactRole, IssueStatus, PipelineType, Stage};
use crate::registry::today;
use crate::store::WriteOp;

/// Show summary metrics per subsystem
pub fn show_status(
    config: &Config,
    group: Option<&str>,
    subsystem: Option<&str>,
    op: WriteOp,
) -> anyhow::Result<Vec<Diagnostic>> {
    let mut diags = vec![];
    let session = open_session(config, op, &mut diags)?;
    let doc = session.doc();

    // Unknown filters are errors, not empty reports
    if let Some(g) = group {
        match subsystem {
            Some(s) => {
                doc.find_subsystem(g, s).map_err(located(g, s))?;
            }
            None => {
                doc.find_group(g).map_err(|e| Diagnostic::from_registry(e, g))?;
            }
        }
    }

    let as_of = today();
    let selected = doc.iter_subsystems().filter(|(g, sub)| {
        group.is_none_or(|want| want == *g) && subsystem.is_none_or(|want| want == sub.name)
    });

    for (g, sub) in selected {
        println!("=== {g}/{} ===\n", sub.name);

        let totals = sub.stage_totals();
        println!("  By Stage:");
        for stage in Stage::ALL {
            println!("    {:12}: {}", stage.label(), totals.get(stage));
        }
        println!("  ----------");
        println!("  Total:        {}\n", totals.total());

        println!("  By Type:");
        for pipeline_type in PipelineType::ALL {
            let records = sub.records(pipeline_type).len();
            println!(
                "    {:12}: {} ({} record(s))",
                pipeline_type.as_ref(),
                sub.pipelines.get(pipeline_type).total(),
                records
            );
        }
        println!();

        println!("  Contacts:");
        for role in ContactRole::ALL {
            println!("    {:18}: {}", role.label(), sub.contacts.get(role).len());
        }
        println!();

        let open: Vec<_> = sub
            .issues
            .iter()
            .filter(|i| i.status != IssueStatus::Closed)
            .collect();
        println!("  Open Issues:  {}", open.len());
        for issue in open {
            println!(
                "    {} [{}] {} ({} day(s) blocked)",
                issue.id,
                issue.status.as_ref(),
                issue.description,
                issue.blocked_days(as_of)
            );
        }
        println!();
    }

    Ok(diags)
}

//! Project initialization.

use crate::cmd::open_session;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::store::WriteOp;
use crate::ui;
use anyhow::Context;

/// Write the default config and seed the data file if it does not exist yet.
/// An existing data file is never replaced.
pub fn init_project(config: &Config, force: bool, op: WriteOp) -> anyhow::Result<Vec<Diagnostic>> {
    let config_path = config.config_path();

    if config_path.exists() && !force && !op.is_preview() {
        anyhow::bail!(
            "{} already exists (use -f to overwrite)",
            config_path.display()
        );
    }

    let config = if op.is_preview() {
        println!("[dry-run] Would write: {}", config_path.display());
        print!("{}", Config::default_toml());
        config.clone()
    } else {
        std::fs::write(&config_path, Config::default_toml())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        ui::created("config", &config_path);
        // Data path now follows the freshly written file
        Config::load(Some(&config_path))?
    };

    let mut diags = vec![];
    let data_path = config.data_path();
    if data_path.exists() {
        ui::info(format!("Keeping existing data file: {}", data_path.display()));
    } else {
        open_session(&config, op, &mut diags)?;
        if op.is_preview() {
            println!("[dry-run] Would seed: {}", data_path.display());
        }
    }

    if !op.is_preview() {
        ui::success("Project initialized");
    }
    Ok(diags)
}

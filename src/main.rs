//! pipeboard: onboarding registry for data pipelines across groups and subsystems.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod diagnostic;
mod error;
mod import;
mod logging;
mod model;
mod registry;
mod store;
mod ui;
mod validate;

mod cmd;

use cmd::issue::IssueChanges;
use cmd::list::ListFilter;
use cmd::pipeline::parse_field;
use config::Config;
use diagnostic::{Diagnostic, DiagnosticLevel};
use model::{ContactRole, IssueStatus, PipelineType};
use store::WriteOp;

#[derive(Parser)]
#[command(name = "pipeboard")]
#[command(about = "Track data pipeline onboarding across groups and subsystems")]
#[command(version)]
struct Cli {
    /// Path to pipeboard config (TOML)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Verbose diagnostic logging (overridden by PIPEBOARD_LOG)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Show what would be written without touching any file
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and seed the data file
    Init {
        /// Overwrite existing config
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Show summary metrics per subsystem
    #[command(visible_alias = "stat")]
    Status {
        /// Only this group
        #[arg(long)]
        group: Option<String>,
        /// Only this subsystem (requires --group)
        #[arg(long, requires = "group")]
        subsystem: Option<String>,
    },

    /// Validate the data file
    #[command(visible_alias = "lint")]
    Check {
        /// Treat warnings as errors
        #[arg(short = 'W', long)]
        deny_warnings: bool,
    },

    /// List registry contents
    #[command(visible_alias = "ls")]
    List {
        /// What to list
        #[arg(value_enum)]
        target: ListTarget,
        /// Only this group
        #[arg(long)]
        group: Option<String>,
        /// Only this subsystem
        #[arg(long)]
        subsystem: Option<String>,
        /// Only this pipeline type (stages, pipelines)
        #[arg(long = "type", value_enum)]
        pipeline_type: Option<PipelineType>,
        /// Maximum number of rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupCommand,
    },

    /// Manage subsystems
    Subsystem {
        #[command(subcommand)]
        action: SubsystemCommand,
    },

    /// Manage pipeline onboarding records
    #[command(visible_alias = "pl")]
    Pipeline {
        #[command(subcommand)]
        action: PipelineCommand,
    },

    /// Manage blocking issues
    Issue {
        #[command(subcommand)]
        action: IssueCommand,
    },

    /// Manage contact rosters
    Contacts {
        #[command(subcommand)]
        action: ContactsCommand,
    },

    /// Rederive stage counts from pipeline records
    Recompute,

    /// Export the whole document as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Clone, Debug)]
enum GroupCommand {
    /// Add an empty group
    Add {
        /// Group name
        name: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
enum SubsystemCommand {
    /// Add an empty subsystem to a group
    Add {
        /// Group name
        group: String,
        /// Subsystem name
        name: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
enum PipelineCommand {
    /// Add a record (e.g. -f pipeline_name=Sales -f status=UAT)
    Add {
        group: String,
        subsystem: String,
        #[arg(value_enum)]
        pipeline_type: PipelineType,
        /// Field assignment key=value (repeatable)
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Merge field changes into the record at INDEX
    Edit {
        group: String,
        subsystem: String,
        #[arg(value_enum)]
        pipeline_type: PipelineType,
        /// 0-based record index
        index: usize,
        /// Field assignment key=value (repeatable)
        #[arg(short = 'f', long = "field", value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete the record at INDEX
    #[command(visible_alias = "rm")]
    Delete {
        group: String,
        subsystem: String,
        #[arg(value_enum)]
        pipeline_type: PipelineType,
        /// 0-based record index
        index: usize,
    },
    /// Bulk-add records from a spreadsheet (first worksheet, header row)
    Import {
        group: String,
        subsystem: String,
        #[arg(value_enum)]
        pipeline_type: PipelineType,
        /// Spreadsheet file (xlsx, xls, xlsb, ods)
        file: PathBuf,
    },
}

#[derive(Subcommand, Clone, Debug)]
enum IssueCommand {
    /// Open a new issue with the next unused id
    New {
        group: String,
        subsystem: String,
        /// What is blocking
        description: String,
        #[arg(long, value_enum, default_value = "open")]
        status: IssueStatus,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Update an existing issue
    Set {
        group: String,
        subsystem: String,
        /// Issue id (e.g. ISS-101)
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<IssueStatus>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
        /// YYYY-MM-DD, or empty to clear
        #[arg(long)]
        close_date: Option<String>,
    },
    /// Delete an issue (its id is never reused)
    #[command(visible_alias = "rm")]
    Delete {
        group: String,
        subsystem: String,
        id: String,
    },
    /// Show blocked days per issue
    Blocked {
        group: String,
        subsystem: String,
        /// Reference date YYYY-MM-DD (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(Subcommand, Clone, Debug)]
enum ContactsCommand {
    /// Replace the names for a role (no names clears it)
    Set {
        group: String,
        subsystem: String,
        #[arg(value_enum)]
        role: ContactRole,
        names: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ListTarget {
    Groups,
    Subsystems,
    Stages,
    Pipelines,
    Issues,
    Contacts,
}

/// Output format for list commands
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON array
    Json,
    /// Tab-separated values
    Plain,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let result = run(&cli);

    match result {
        Ok(diags) => {
            let has_errors = diags.iter().any(|d| d.level == DiagnosticLevel::Error);
            let has_warnings = diags.iter().any(|d| d.level == DiagnosticLevel::Warning);

            for diag in &diags {
                ui::diagnostic(diag);
            }

            if has_errors {
                ExitCode::FAILURE
            } else if has_warnings {
                if matches!(
                    cli.command,
                    Commands::Check {
                        deny_warnings: true,
                    }
                ) {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            match e.downcast_ref::<Diagnostic>() {
                Some(diag) => ui::diagnostic(diag),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Vec<Diagnostic>> {
    let config = Config::load(cli.config.as_deref())?;
    let op = WriteOp::from_dry_run(cli.dry_run);
    tracing::debug!(
        project = %config.project.name,
        data = %config.data_path().display(),
        ?op,
        "resolved config"
    );

    match &cli.command {
        Commands::Init { force } => cmd::init::init_project(&config, *force, op),
        Commands::Status { group, subsystem } => {
            cmd::status::show_status(&config, group.as_deref(), subsystem.as_deref(), op)
        }
        Commands::Check { deny_warnings: _ } => cmd::check::check_all(&config, op),
        Commands::List {
            target,
            group,
            subsystem,
            pipeline_type,
            limit,
            output,
        } => {
            let filter = ListFilter {
                group: group.as_deref(),
                subsystem: subsystem.as_deref(),
                pipeline_type: *pipeline_type,
                limit: *limit,
            };
            cmd::list::list(&config, *target, filter, *output, op)
        }
        Commands::Group { action } => match action {
            GroupCommand::Add { name } => cmd::structure::add_group(&config, name, op),
        },
        Commands::Subsystem { action } => match action {
            SubsystemCommand::Add { group, name } => {
                cmd::structure::add_subsystem(&config, group, name, op)
            }
        },
        Commands::Pipeline { action } => match action {
            PipelineCommand::Add {
                group,
                subsystem,
                pipeline_type,
                fields,
            } => cmd::pipeline::add(&config, group, subsystem, *pipeline_type, fields, op),
            PipelineCommand::Edit {
                group,
                subsystem,
                pipeline_type,
                index,
                fields,
            } => cmd::pipeline::edit(
                &config,
                group,
                subsystem,
                *pipeline_type,
                *index,
                fields,
                op,
            ),
            PipelineCommand::Delete {
                group,
                subsystem,
                pipeline_type,
                index,
            } => cmd::pipeline::delete(&config, group, subsystem, *pipeline_type, *index, op),
            PipelineCommand::Import {
                group,
                subsystem,
                pipeline_type,
                file,
            } => cmd::pipeline::import(&config, group, subsystem, *pipeline_type, file, op),
        },
        Commands::Issue { action } => match action {
            IssueCommand::New {
                group,
                subsystem,
                description,
                status,
                start_date,
            } => cmd::issue::new_issue(
                &config,
                group,
                subsystem,
                description,
                *status,
                start_date.as_deref(),
                op,
            ),
            IssueCommand::Set {
                group,
                subsystem,
                id,
                description,
                status,
                start_date,
                close_date,
            } => {
                let changes = IssueChanges {
                    description: description.as_deref(),
                    status: *status,
                    start_date: start_date.as_deref(),
                    close_date: close_date.as_deref(),
                };
                cmd::issue::set_issue(&config, group, subsystem, id, &changes, op)
            }
            IssueCommand::Delete {
                group,
                subsystem,
                id,
            } => cmd::issue::delete_issue(&config, group, subsystem, id, op),
            IssueCommand::Blocked {
                group,
                subsystem,
                as_of,
            } => cmd::issue::blocked(&config, group, subsystem, as_of.as_deref(), op),
        },
        Commands::Contacts { action } => match action {
            ContactsCommand::Set {
                group,
                subsystem,
                role,
                names,
            } => cmd::contacts::set_contacts(&config, group, subsystem, *role, names, op),
        },
        Commands::Recompute => cmd::pipeline::recompute(&config, op),
        Commands::Export { output } => cmd::export::export(&config, output.as_deref(), op),
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "pipeboard",
                &mut std::io::stdout(),
            );
            Ok(vec![])
        }
    }
}

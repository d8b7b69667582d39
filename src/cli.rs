//! CLI surface
//!
//! Argument parsing, command dispatch, and the mapping from library
//! errors to exit codes. All user-facing error reporting happens here;
//! library crates only return typed errors.

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::{Instrument, warn};

use coinforge_config::Config;
use coinforge_orchestrator::{Orchestrator, RunError};
use coinforge_params::ProjectParameters;
use coinforge_store::{Project, ProjectId, ProjectStore};
use coinforge_tasks::default_tasks;
use coinforge_utils::error::{CoinforgeError, UserFriendlyError};
use coinforge_utils::exit_codes::ExitCode;
use coinforge_utils::logging::{init_tracing, run_span};

use crate::advisor::{Advisor, Suggestion};
use crate::checklist::ChecklistObserver;
use crate::kit;

#[derive(Parser)]
#[command(
    name = "coinforge",
    version,
    about = "Design and launch a cryptocurrency project from a guided plan"
)]
struct Cli {
    /// Verbose logging (targets and span timings)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Explicit configuration file instead of upward discovery
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every generation task for a launch plan and write the kit
    Launch {
        /// Path to the launch plan (TOML)
        plan: Utf8PathBuf,

        /// Owner the project is filed under when saved
        #[arg(long, default_value = "default")]
        owner: String,

        /// Persist the project to the store after a successful run
        #[arg(long)]
        save: bool,

        /// Kit output directory (default: configured kit_dir, then
        /// <home>/kits/<project>)
        #[arg(long, value_name = "DIR")]
        out: Option<Utf8PathBuf>,

        /// Override the backend's default model for this run
        #[arg(long)]
        model: Option<String>,
    },

    /// Inspect and manage saved projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Verify a launch kit directory against its manifest
    Verify {
        /// Kit directory containing manifest.json
        dir: Utf8PathBuf,
    },

    /// Ask a question about a saved project
    Ask {
        /// Project id to ask about
        id: String,

        /// The question
        question: String,

        #[arg(long, default_value = "default")]
        owner: String,
    },

    /// Explain a cryptocurrency concept
    Explain {
        /// Concept to explain, e.g. "halving" or "coinbase maturity"
        concept: String,
    },

    /// Suggest content for a launch plan field
    Suggest {
        /// Plan field to draft, e.g. "mission_statement"
        field: String,

        /// Existing value to improve instead of drafting from scratch
        #[arg(long)]
        current: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProjectsAction {
    /// List saved project ids for an owner
    List {
        #[arg(long, default_value = "default")]
        owner: String,
    },
    /// Print a saved project's summary and artifact fields
    Show {
        id: String,
        #[arg(long, default_value = "default")]
        owner: String,
    },
    /// Delete a saved project
    Delete {
        id: String,
        #[arg(long, default_value = "default")]
        owner: String,
    },
}

/// Parse arguments, execute, and fold every outcome into an exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        // A second init (e.g. under a test harness) is not fatal
        eprintln!("warning: logging setup failed: {e}");
    }

    match execute(cli).await {
        Ok(()) => ExitCode::Success,
        Err(CliError::Run(err)) => {
            report_run_failure(&err);
            ExitCode::RunFailed
        }
        Err(CliError::Lib(err)) => {
            report_error(&err);
            ExitCode::from_error(&err)
        }
    }
}

enum CliError {
    Lib(CoinforgeError),
    Run(RunError),
}

impl From<CoinforgeError> for CliError {
    fn from(err: CoinforgeError) -> Self {
        Self::Lib(err)
    }
}

async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Launch {
            plan,
            owner,
            save,
            out,
            model,
        } => launch(&config, &plan, &owner, save, out, model).await,
        Command::Projects { action } => {
            projects(action)?;
            Ok(())
        }
        Command::Verify { dir } => {
            let manifest = kit::verify_kit(&dir)?;
            println!(
                "Kit '{}' verified: {} files intact",
                manifest.project,
                manifest.files.len()
            );
            Ok(())
        }
        Command::Ask {
            id,
            question,
            owner,
        } => {
            let store = ProjectStore::new();
            let project = store.load(&owner, &id).map_err(CoinforgeError::from)?;
            let advisor = build_advisor(&config)?;
            let answer = advisor.ask_project(&project, &question).await?;
            println!("{answer}");
            Ok(())
        }
        Command::Explain { concept } => {
            let advisor = build_advisor(&config)?;
            let answer = advisor.explain(&concept).await?;
            println!("{answer}");
            Ok(())
        }
        Command::Suggest { field, current } => {
            let suggestion = match current {
                Some(current) => Suggestion::Improve { field, current },
                None => Suggestion::Generate { field },
            };
            let advisor = build_advisor(&config)?;
            let answer = advisor.suggest(&suggestion).await?;
            println!("{answer}");
            Ok(())
        }
    }
}

fn load_config(explicit: Option<&camino::Utf8Path>) -> Result<Config, CoinforgeError> {
    let config = match explicit {
        Some(path) => Config::load_from(path)?,
        None => Config::discover_from_cwd()?,
    };
    Ok(config)
}

fn build_advisor(config: &Config) -> Result<Advisor, CoinforgeError> {
    let backend = coinforge_llm::from_config(config)?;
    Ok(Advisor::new(backend, config.request_timeout()))
}

async fn launch(
    config: &Config,
    plan: &camino::Utf8Path,
    owner: &str,
    save: bool,
    out: Option<Utf8PathBuf>,
    model: Option<String>,
) -> Result<(), CliError> {
    let params = ProjectParameters::load(plan)?;
    let project_id = ProjectId::from_project_name(&params.name).map_err(CoinforgeError::from)?;

    let (backend, fallback) = coinforge_llm::from_config_with_fallback(config)
        .map_err(CoinforgeError::from)?;
    if let Some(info) = fallback {
        warn!(
            primary = %info.primary_provider,
            fallback = %info.fallback_provider,
            "Using fallback provider: {}",
            info.reason
        );
    }

    let mut orchestrator = Orchestrator::new(Arc::clone(&backend), default_tasks())
        .with_timeout(config.request_timeout());
    if let Some(model) = model {
        orchestrator = orchestrator.with_model(model);
    }

    let kit_dir = out
        .or_else(|| {
            config
                .output
                .kit_dir
                .as_ref()
                .map(|d| d.join(project_id.as_str()))
        })
        .unwrap_or_else(|| kit::default_kit_dir(project_id.as_str()));

    eprintln!("Generating launch kit for {} ({})", params.name, params.ticker);
    let observer = ChecklistObserver::new();
    let result = match orchestrator
        .run(&params, &observer)
        .instrument(run_span(&params.name, config.provider()))
        .await
    {
        Ok(result) => result,
        Err(err) => {
            if let RunError::TasksFailed { partial, .. } = &err {
                if !partial.is_empty() {
                    let partial_dir = kit::partial_kit_dir(&kit_dir);
                    match kit::write_kit(&partial_dir, project_id.as_str(), partial) {
                        Ok(manifest) => eprintln!(
                            "Kept {} completed artifacts in {partial_dir}",
                            manifest.files.len()
                        ),
                        Err(write_err) => eprintln!(
                            "warning: could not keep completed artifacts: {write_err}"
                        ),
                    }
                }
            }
            return Err(CliError::Run(err));
        }
    };

    let manifest = kit::write_kit(&kit_dir, project_id.as_str(), &result)?;
    println!("Launch kit written to {kit_dir} ({} files)", manifest.files.len());

    if save {
        let store = ProjectStore::new();
        let project = Project::from_run(project_id.clone(), owner, params, result);
        store.save(&project).map_err(CoinforgeError::from)?;
        println!("Saved project '{project_id}' for owner '{owner}'");
    }

    Ok(())
}

fn projects(action: ProjectsAction) -> Result<(), CoinforgeError> {
    let store = ProjectStore::new();
    match action {
        ProjectsAction::List { owner } => {
            let ids = store.list(&owner)?;
            if ids.is_empty() {
                println!("No saved projects for owner '{owner}'");
            }
            for id in ids {
                println!("{id}");
            }
        }
        ProjectsAction::Show { id, owner } => {
            let project = store.load(&owner, &id)?;
            println!("{} ({})", project.params.name, project.params.ticker);
            println!("owner: {}", project.owner);
            println!("created: {}", project.created_at.to_rfc3339());
            println!("consensus: {}", project.params.consensus);
            println!("artifacts:");
            for (field, payload) in project.result.iter() {
                println!("  {field}: {} bytes", payload.len());
            }
            let tampered = project.tampered_fields();
            if !tampered.is_empty() {
                println!("warning: artifacts modified since save: {}", tampered.join(", "));
            }
        }
        ProjectsAction::Delete { id, owner } => {
            store.delete(&owner, &id)?;
            println!("Deleted project '{id}' for owner '{owner}'");
        }
    }
    Ok(())
}

fn report_error(err: &CoinforgeError) {
    match err {
        CoinforgeError::Config(e) => report_friendly(e),
        CoinforgeError::Validation(e) => report_friendly(e),
        CoinforgeError::Llm(e) => report_friendly(e),
        other => eprintln!("error: {other}"),
    }
}

fn report_friendly(err: &dyn UserFriendlyError) {
    eprintln!("error: {}", err.user_message());
    if let Some(context) = err.context() {
        eprintln!("  {context}");
    }
    for suggestion in err.suggestions() {
        eprintln!("  hint: {suggestion}");
    }
}

fn report_run_failure(err: &RunError) {
    eprintln!("error: {err}");
    if let RunError::TasksFailed {
        statuses, partial, ..
    } = err
    {
        let failed = err.failed_tasks();
        let pending: Vec<_> = statuses
            .iter()
            .filter(|(_, s)| s.state == coinforge_task_api::TaskState::Pending)
            .map(|(id, _)| id.to_string())
            .collect();
        eprintln!(
            "  {} of {} tasks completed",
            partial.len(),
            statuses.len()
        );
        eprintln!(
            "  failed: {}",
            failed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        if !pending.is_empty() {
            eprintln!("  skipped (upstream failed): {}", pending.join(", "));
        }
        eprintln!("  re-run once the cause is fixed");
    }
}

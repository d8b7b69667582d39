//! coinforge: design and launch a cryptocurrency project from a guided
//! plan, one LLM task at a time.
//!
//! The binary is a thin shell over the workspace crates: the launch plan
//! lives in `coinforge-params`, the task set in `coinforge-tasks`, the
//! DAG executor in `coinforge-orchestrator`, and persistence in
//! `coinforge-store`. This crate adds the CLI surface, the terminal
//! checklist renderer, launch kit output, and the one-shot advisor
//! commands.

pub mod advisor;
pub mod checklist;
pub mod cli;
pub mod kit;

pub use coinforge_orchestrator::{Orchestrator, RunError};
pub use coinforge_params::{ConsensusMechanism, ProjectParameters};
pub use coinforge_store::{Project, ProjectId, ProjectStore};
pub use coinforge_task_api::{GenerationResult, TaskId, TaskState};
pub use coinforge_utils::exit_codes::ExitCode;

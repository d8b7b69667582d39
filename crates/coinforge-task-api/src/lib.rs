//! Task trait, identifiers, and status vocabulary for the generation pipeline
//!
//! A generation run is a shallow DAG of tasks. Each task declares its
//! identity, its upstream dependencies, the result field it produces, how
//! to build its prompt from the launch plan (plus any upstream outputs),
//! and how to validate the raw model response into a payload.
//!
//! The orchestrator crate drives tasks; this crate only defines the
//! contract between them.

mod status;
mod task;

pub use status::{FnObserver, NullObserver, StatusObserver, TaskState, TaskStatus, TaskUpdate};
pub use task::{GenerationResult, GenerationTask, TaskId, UpstreamOutputs};

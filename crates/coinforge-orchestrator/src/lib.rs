//! Concurrent execution of the generation task DAG
//!
//! One [`Orchestrator::run`] call executes every task against the
//! backend: root tasks are dispatched together, dependent tasks only
//! once all of their upstreams have succeeded. Failures are isolated to
//! the failing task and whatever depends on it; unrelated tasks always
//! run to completion.
//!
//! All status bookkeeping happens on the control loop, so observers see
//! a serialized, ordered stream of transitions for any one run. Each run
//! starts from fresh state; the orchestrator itself is reusable.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use coinforge_llm::{LlmBackend, LlmInvocation, Message};
use coinforge_params::ProjectParameters;
use coinforge_task_api::{
    GenerationResult, GenerationTask, StatusObserver, TaskId, TaskStatus, TaskUpdate,
    UpstreamOutputs,
};
use coinforge_utils::error::TaskError;

/// Default per-task backend timeout when the caller does not set one.
const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of a failed run.
///
/// A run fails as a whole when any task fails, but everything that could
/// complete did: `partial` holds the successful payloads and `statuses`
/// the final state of every task, including tasks left pending because
/// an upstream failed.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("generation failed: task {task}: {message}")]
    TasksFailed {
        /// The first task to fail, in completion order.
        task: TaskId,
        message: String,
        statuses: BTreeMap<TaskId, TaskStatus>,
        partial: GenerationResult,
    },

    #[error("invalid task graph: {reason}")]
    InvalidGraph { reason: String },
}

impl RunError {
    /// Every task that ended in the error state, in stable order.
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<TaskId> {
        match self {
            Self::TasksFailed { statuses, .. } => statuses
                .iter()
                .filter(|(_, s)| s.error.is_some())
                .map(|(id, _)| *id)
                .collect(),
            Self::InvalidGraph { .. } => Vec::new(),
        }
    }
}

/// Drives one set of generation tasks against one backend.
pub struct Orchestrator {
    backend: Arc<dyn LlmBackend>,
    tasks: Vec<Arc<dyn GenerationTask>>,
    model: String,
    timeout: Duration,
}

impl Orchestrator {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, tasks: Vec<Arc<dyn GenerationTask>>) -> Self {
        Self {
            backend,
            tasks,
            model: String::new(),
            timeout: DEFAULT_TASK_TIMEOUT,
        }
    }

    /// Override the backend's default model for every task in the run.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Per-task backend timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute every task for the given plan, reporting each status
    /// transition through `observer`.
    ///
    /// Observers first see every task as pending, then transitions as
    /// tasks dispatch and resolve. A task whose upstream failed is never
    /// dispatched and stays pending in the final status map.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidGraph` if the task set is malformed and
    /// `RunError::TasksFailed` when any task fails; in the latter case
    /// the error carries the full status map and all successful payloads.
    pub async fn run(
        &self,
        params: &ProjectParameters,
        observer: &dyn StatusObserver,
    ) -> Result<GenerationResult, RunError> {
        self.validate_graph()?;

        let mut state = RunState::new(&self.tasks);
        for task in &self.tasks {
            state.transition(task.id(), TaskStatus::pending(), observer);
        }

        info!(
            project = %params.name,
            tasks = self.tasks.len(),
            "Starting generation run"
        );

        let mut join_set: JoinSet<(TaskId, Result<String, TaskError>)> = JoinSet::new();
        self.dispatch_ready(&mut state, &mut join_set, params, observer);

        let mut first_failure: Option<TaskId> = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, Ok(payload))) => {
                    debug!(task = %id, bytes = payload.len(), "Task succeeded");
                    state.record_success(id, payload, &self.tasks);
                    state.transition(id, TaskStatus::success(), observer);
                    self.dispatch_ready(&mut state, &mut join_set, params, observer);
                }
                Ok((id, Err(task_err))) => {
                    warn!(task = %id, error = %task_err, "Task failed");
                    first_failure.get_or_insert(id);
                    state.transition(id, TaskStatus::failed(task_err.to_string()), observer);
                }
                Err(join_err) => {
                    // A panicked worker is reported as a failure of its task,
                    // not a failure of the run machinery.
                    let id = state.task_for_join_id(join_err.id());
                    warn!(task = ?id, error = %join_err, "Task worker terminated abnormally");
                    let Some(id) = id else { continue };
                    first_failure.get_or_insert(id);
                    state.transition(
                        id,
                        TaskStatus::failed(format!("task worker terminated: {join_err}")),
                        observer,
                    );
                }
            }
        }

        let RunState {
            statuses, result, ..
        } = state;

        if let Some(task) = first_failure {
            let message = statuses
                .get(&task)
                .and_then(|s| s.error.clone())
                .unwrap_or_else(|| "unknown failure".to_string());
            info!(
                project = %params.name,
                failed = %task,
                completed = result.len(),
                "Generation run failed"
            );
            return Err(RunError::TasksFailed {
                task,
                message,
                statuses,
                partial: result,
            });
        }

        // No failures, nothing running: every task must have resolved.
        if statuses.values().any(|s| !s.is_terminal()) {
            return Err(RunError::InvalidGraph {
                reason: "tasks remained pending with no failed upstream; \
                         the dependency graph contains a cycle"
                    .to_string(),
            });
        }

        info!(
            project = %params.name,
            fields = result.len(),
            "Generation run complete"
        );
        Ok(result)
    }

    /// Dispatch every task whose upstreams have all succeeded. Prompts
    /// are built here on the control loop so upstream snapshots never
    /// race with later completions.
    fn dispatch_ready(
        &self,
        state: &mut RunState,
        join_set: &mut JoinSet<(TaskId, Result<String, TaskError>)>,
        params: &ProjectParameters,
        observer: &dyn StatusObserver,
    ) {
        for task in &self.tasks {
            let id = task.id();
            if state.dispatched.contains(&id) || !state.deps_satisfied(task.as_ref()) {
                continue;
            }
            state.dispatched.insert(id);
            state.transition(id, TaskStatus::running(), observer);

            let prompt = task.prompt(params, &state.upstream);
            let invocation = LlmInvocation::new(
                params.name.clone(),
                id.as_str(),
                self.model.clone(),
                self.timeout,
                vec![Message::user(prompt)],
            );
            let backend = Arc::clone(&self.backend);
            let task = Arc::clone(task);
            let handle = join_set.spawn(async move {
                let outcome = match backend.invoke(invocation).await {
                    Ok(response) => task.parse(&response.raw_response),
                    Err(llm_err) => Err(TaskError::Backend {
                        task: task.id().as_str().to_string(),
                        source: llm_err,
                    }),
                };
                (task.id(), outcome)
            });
            state.join_ids.insert(handle.id(), id);
        }
    }

    fn validate_graph(&self) -> Result<(), RunError> {
        let mut seen = BTreeSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id()) {
                return Err(RunError::InvalidGraph {
                    reason: format!("task {} appears more than once", task.id()),
                });
            }
        }
        for task in &self.tasks {
            for dep in task.deps() {
                if !seen.contains(dep) {
                    return Err(RunError::InvalidGraph {
                        reason: format!(
                            "task {} depends on {}, which is not in the task set",
                            task.id(),
                            dep
                        ),
                    });
                }
                if *dep == task.id() {
                    return Err(RunError::InvalidGraph {
                        reason: format!("task {} depends on itself", task.id()),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Mutable state for one run. Owned by the control loop; workers only
/// ever hand back completed payloads.
struct RunState {
    statuses: BTreeMap<TaskId, TaskStatus>,
    upstream: UpstreamOutputs,
    result: GenerationResult,
    dispatched: BTreeSet<TaskId>,
    join_ids: HashMap<tokio::task::Id, TaskId>,
}

impl RunState {
    fn new(tasks: &[Arc<dyn GenerationTask>]) -> Self {
        let statuses = tasks
            .iter()
            .map(|t| (t.id(), TaskStatus::pending()))
            .collect();
        Self {
            statuses,
            upstream: UpstreamOutputs::new(),
            result: GenerationResult::new(),
            dispatched: BTreeSet::new(),
            join_ids: HashMap::new(),
        }
    }

    fn transition(&mut self, id: TaskId, status: TaskStatus, observer: &dyn StatusObserver) {
        self.statuses.insert(id, status.clone());
        observer.task_update(&TaskUpdate { task: id, status });
    }

    fn deps_satisfied(&self, task: &dyn GenerationTask) -> bool {
        task.deps().iter().all(|dep| {
            self.statuses
                .get(dep)
                .is_some_and(|s| s.state == coinforge_task_api::TaskState::Success)
        })
    }

    fn record_success(&mut self, id: TaskId, payload: String, tasks: &[Arc<dyn GenerationTask>]) {
        if let Some(task) = tasks.iter().find(|t| t.id() == id) {
            self.result.insert(task.output_field(), payload.clone());
        }
        self.upstream.insert(id, payload);
    }

    fn task_for_join_id(&self, join_id: tokio::task::Id) -> Option<TaskId> {
        self.join_ids.get(&join_id).copied()
    }
}

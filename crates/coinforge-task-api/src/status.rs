//! Per-task status vocabulary and the observer seam
//!
//! The orchestrator reports every status transition through a
//! [`StatusObserver`] so callers can render live progress without the
//! orchestrator knowing anything about presentation.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Lifecycle state of a single task within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Not yet dispatched. Tasks whose upstream failed stay here.
    Pending,
    /// Dispatched to the backend; awaiting a response.
    Running,
    /// Payload validated and recorded.
    Success,
    /// Backend or validation failure, recorded in `TaskStatus::error`.
    Error,
}

/// Status of one task: its state plus the failure message when errored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Present exactly when `state` is [`TaskState::Error`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskStatus {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            state: TaskState::Pending,
            error: None,
        }
    }

    #[must_use]
    pub fn running() -> Self {
        Self {
            state: TaskState::Running,
            error: None,
        }
    }

    #[must_use]
    pub fn success() -> Self {
        Self {
            state: TaskState::Success,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: TaskState::Error,
            error: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TaskState::Success | TaskState::Error)
    }
}

/// One status transition, as delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task: TaskId,
    pub status: TaskStatus,
}

/// Receives task status transitions during a run.
///
/// Called synchronously from the orchestrator's control loop, so updates
/// for any one run arrive in order. Implementations should return
/// quickly.
pub trait StatusObserver: Send + Sync {
    fn task_update(&self, update: &TaskUpdate);
}

/// Observer that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StatusObserver for NullObserver {
    fn task_update(&self, _update: &TaskUpdate) {}
}

/// Adapter so a closure can serve as an observer.
pub struct FnObserver<F>(pub F);

impl<F> StatusObserver for FnObserver<F>
where
    F: Fn(&TaskUpdate) + Send + Sync,
{
    fn task_update(&self, update: &TaskUpdate) {
        (self.0)(update);
    }
}

//! End-to-end execution of the full launch task set against a scripted
//! backend: concurrency, failure isolation, and status reporting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coinforge_llm::ScriptedBackend;
use coinforge_orchestrator::{Orchestrator, RunError};
use coinforge_params::ProjectParameters;
use coinforge_task_api::{StatusObserver, TaskId, TaskState, TaskUpdate};
use coinforge_tasks::default_tasks;
use coinforge_utils::error::LlmError;

/// Records every status transition in arrival order.
#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<(TaskId, TaskState)>>,
}

impl Recorder {
    fn snapshot(&self) -> Vec<(TaskId, TaskState)> {
        self.updates.lock().unwrap().clone()
    }

    fn states(&self) -> Vec<TaskState> {
        self.snapshot().iter().map(|(_, s)| *s).collect()
    }
}

impl StatusObserver for Recorder {
    fn task_update(&self, update: &TaskUpdate) {
        self.updates
            .lock()
            .unwrap()
            .push((update.task, update.status.state));
    }
}

/// Scripted bodies that satisfy each task's output shape. Tasks not
/// listed fall back to the backend's plain stub body.
fn scripted_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .with_response("logo", "data:image/svg+xml;utf8,%3Csvg%3E%3C/svg%3E")
        .with_response("genesis-block", "{\"version\": 1, \"coinbase_message\": \"{project} genesis\"}")
        .with_response("network-config", "[network]\np2p_port = 9333\n# {project}")
        .with_response(
            "landing-page",
            "<!doctype html><html><body>{project}</body></html>",
        )
        .with_prompt_echo("node-setup")
}

fn params() -> ProjectParameters {
    ProjectParameters::minimal_for_testing("NovaCoin", "NVC")
}

#[tokio::test]
async fn happy_path_produces_every_field() {
    let backend = Arc::new(scripted_backend());
    let orchestrator = Orchestrator::new(backend.clone(), default_tasks());
    let recorder = Recorder::default();

    let result = orchestrator.run(&params(), &recorder).await.unwrap();

    assert_eq!(result.len(), 11);
    for field in [
        "whitepaper",
        "tokenomics",
        "community_strategy",
        "logo_data_uri",
        "genesis_block",
        "network_config",
        "compilation_guide",
        "pitch_deck",
        "social_campaign",
        "landing_page",
        "node_setup",
    ] {
        assert!(result.contains(field), "missing field {field}");
    }

    // Dependent prompt embedded the upstream payloads
    let node_setup = result.get("node_setup").unwrap();
    assert!(node_setup.contains("{\"version\": 1"));
    assert!(node_setup.contains("p2p_port = 9333"));

    // The dependent task was invoked last, after its three upstreams
    let order = backend.invocation_order();
    assert_eq!(order.len(), 11);
    assert_eq!(order.last().map(String::as_str), Some("node-setup"));

    // Every task ended in success: 11 pending, 11 running, 11 success
    let states = recorder.states();
    assert_eq!(states.len(), 33);
    assert_eq!(
        states.iter().filter(|s| **s == TaskState::Success).count(),
        11
    );
}

#[tokio::test]
async fn upstream_failure_leaves_dependent_pending() {
    let backend = Arc::new(
        scripted_backend().with_failure(
            "genesis-block",
            LlmError::Transport("connection reset".to_string()),
        ),
    );
    let orchestrator = Orchestrator::new(backend.clone(), default_tasks());
    let recorder = Recorder::default();

    let err = orchestrator.run(&params(), &recorder).await.unwrap_err();
    let RunError::TasksFailed {
        task,
        statuses,
        partial,
        ..
    } = err
    else {
        panic!("expected TasksFailed");
    };

    assert_eq!(task, TaskId::GenesisBlock);
    assert_eq!(statuses[&TaskId::GenesisBlock].state, TaskState::Error);
    assert!(statuses[&TaskId::GenesisBlock].error.is_some());

    // The dependent was never dispatched and carries no error of its own
    assert_eq!(statuses[&TaskId::NodeSetup].state, TaskState::Pending);
    assert!(statuses[&TaskId::NodeSetup].error.is_none());
    assert!(!backend.invocation_order().contains(&"node-setup".to_string()));

    // Unrelated roots all completed
    assert_eq!(partial.len(), 9);
    assert!(partial.contains("whitepaper"));
    assert!(!partial.contains("genesis_block"));
    assert!(!partial.contains("node_setup"));
    for id in [TaskId::Whitepaper, TaskId::Tokenomics, TaskId::Logo] {
        assert_eq!(statuses[&id].state, TaskState::Success);
    }
}

#[tokio::test]
async fn multiple_failures_all_appear_in_statuses() {
    let backend = Arc::new(
        scripted_backend()
            .with_failure("whitepaper", LlmError::Timeout { seconds: 120 })
            .with_failure("tokenomics", LlmError::EmptyResponse),
    );
    let orchestrator = Orchestrator::new(backend, default_tasks());

    let err = orchestrator
        .run(&params(), &coinforge_task_api::NullObserver)
        .await
        .unwrap_err();

    let failed = err.failed_tasks();
    assert_eq!(failed, vec![TaskId::Whitepaper, TaskId::Tokenomics]);

    let RunError::TasksFailed { task, partial, .. } = err else {
        panic!("expected TasksFailed");
    };
    // The reported task is whichever failure completed first
    assert!(task == TaskId::Whitepaper || task == TaskId::Tokenomics);
    assert_eq!(partial.len(), 9);
}

#[tokio::test]
async fn reruns_start_from_fresh_state() {
    let backend = Arc::new(scripted_backend());
    let orchestrator = Orchestrator::new(backend, default_tasks());

    let first = orchestrator
        .run(&params(), &coinforge_task_api::NullObserver)
        .await
        .unwrap();

    let recorder = Recorder::default();
    let second = orchestrator.run(&params(), &recorder).await.unwrap();

    assert_eq!(first, second);

    // The second run re-announced every task as pending before dispatch
    let states = recorder.states();
    assert!(states[..11].iter().all(|s| *s == TaskState::Pending));
}

#[tokio::test]
async fn all_roots_dispatch_before_any_resolution() {
    let backend = Arc::new(
        scripted_backend()
            .with_latency("whitepaper", Duration::from_millis(30))
            .with_latency("tokenomics", Duration::from_millis(10)),
    );
    let orchestrator = Orchestrator::new(backend, default_tasks());
    let recorder = Recorder::default();

    orchestrator.run(&params(), &recorder).await.unwrap();

    let states = recorder.states();
    assert!(states[..11].iter().all(|s| *s == TaskState::Pending));
    // The ten root tasks all report running before the first resolution
    assert!(states[11..21].iter().all(|s| *s == TaskState::Running));
    assert_eq!(
        states[11..]
            .iter()
            .position(|s| *s == TaskState::Success)
            .unwrap()
            + 11,
        21
    );
}

#[tokio::test]
async fn dependent_waits_for_its_slowest_upstream() {
    let backend = Arc::new(
        scripted_backend().with_latency("genesis-block", Duration::from_millis(50)),
    );
    let orchestrator = Orchestrator::new(backend, default_tasks());
    let recorder = Recorder::default();

    orchestrator.run(&params(), &recorder).await.unwrap();

    let updates = recorder.snapshot();
    let position = |task: TaskId, state: TaskState| {
        updates
            .iter()
            .position(|(t, s)| *t == task && *s == state)
            .unwrap_or_else(|| panic!("no {state:?} update for {task}"))
    };

    let dependent_running = position(TaskId::NodeSetup, TaskState::Running);
    for upstream in [
        TaskId::GenesisBlock,
        TaskId::NetworkConfig,
        TaskId::CompilationGuide,
    ] {
        assert!(
            position(upstream, TaskState::Success) < dependent_running,
            "{upstream} resolved after node setup dispatched"
        );
    }
}

#[tokio::test]
async fn backend_errors_are_attributed_to_their_task() {
    let backend = Arc::new(
        scripted_backend().with_failure("logo", LlmError::Quota("rate limited".to_string())),
    );
    let orchestrator = Orchestrator::new(backend, default_tasks());

    let err = orchestrator
        .run(&params(), &coinforge_task_api::NullObserver)
        .await
        .unwrap_err();

    let RunError::TasksFailed { task, message, .. } = err else {
        panic!("expected TasksFailed");
    };
    assert_eq!(task, TaskId::Logo);
    assert!(message.contains("rate limited"), "message: {message}");
}

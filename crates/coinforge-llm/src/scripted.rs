//! Deterministic scripted backend for tests
//!
//! Responds per task from a script table: a fixed body, an echo of the
//! prompt it received, or a failure, each with optional simulated
//! latency. Records invocation order so tests can assert on dispatch
//! behavior.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use coinforge_utils::error::LlmError;

use crate::types::{LlmBackend, LlmInvocation, LlmResult, Role};

/// How the scripted backend answers one task.
pub enum ScriptedResponse {
    /// Return this body verbatim.
    Fixed(String),
    /// Return the full prompt the task sent, prefixed with a stub marker.
    /// Used to prove upstream outputs flow into dependent prompts.
    EchoPrompt,
    /// Fail with the given error.
    Fail(LlmError),
}

struct ScriptEntry {
    response: ScriptedResponse,
    latency: Duration,
}

/// Test backend with per-task scripted responses.
///
/// Unscripted tasks get a deterministic stub body:
/// `"<task> stub for <project>"`.
pub struct ScriptedBackend {
    script: HashMap<String, ScriptEntry>,
    invocations: Mutex<Vec<String>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Script a fixed response body for a task.
    #[must_use]
    pub fn with_response(mut self, task: &str, body: impl Into<String>) -> Self {
        self.script.insert(
            task.to_string(),
            ScriptEntry {
                response: ScriptedResponse::Fixed(body.into()),
                latency: Duration::ZERO,
            },
        );
        self
    }

    /// Script a prompt echo for a task.
    #[must_use]
    pub fn with_prompt_echo(mut self, task: &str) -> Self {
        self.script.insert(
            task.to_string(),
            ScriptEntry {
                response: ScriptedResponse::EchoPrompt,
                latency: Duration::ZERO,
            },
        );
        self
    }

    /// Script a failure for a task.
    #[must_use]
    pub fn with_failure(mut self, task: &str, error: LlmError) -> Self {
        self.script.insert(
            task.to_string(),
            ScriptEntry {
                response: ScriptedResponse::Fail(error),
                latency: Duration::ZERO,
            },
        );
        self
    }

    /// Add simulated latency to a task's scripted response, creating a
    /// default stub entry if the task is not yet scripted.
    #[must_use]
    pub fn with_latency(mut self, task: &str, latency: Duration) -> Self {
        self.script
            .entry(task.to_string())
            .or_insert(ScriptEntry {
                response: ScriptedResponse::Fixed(Self::stub_body(task, "")),
                latency: Duration::ZERO,
            })
            .latency = latency;
        self
    }

    /// The default stub body for an unscripted task.
    #[must_use]
    pub fn stub_body(task: &str, project: &str) -> String {
        format!("{task} stub for {project}")
    }

    /// Task names in the order they were invoked.
    #[must_use]
    pub fn invocation_order(&self) -> Vec<String> {
        self.invocations.lock().expect("invocations lock").clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        self.invocations
            .lock()
            .expect("invocations lock")
            .push(inv.task.clone());

        let entry = self.script.get(&inv.task);
        if let Some(e) = entry {
            if !e.latency.is_zero() {
                tokio::time::sleep(e.latency).await;
            }
        }

        let body = match entry.map(|e| &e.response) {
            None => Self::stub_body(&inv.task, &inv.project),
            Some(ScriptedResponse::Fixed(body)) => {
                // Scripted bodies may reference the project by placeholder
                body.replace("{project}", &inv.project)
            }
            Some(ScriptedResponse::EchoPrompt) => {
                let prompt: String = inv
                    .messages
                    .iter()
                    .filter(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{} stub echoing prompt:\n{prompt}", inv.task)
            }
            Some(ScriptedResponse::Fail(err)) => {
                return Err(clone_error(err));
            }
        };

        Ok(LlmResult::new(body, "scripted", "scripted-model"))
    }
}

// LlmError is not Clone (it can wrap io errors elsewhere in the
// taxonomy), so the script table rebuilds an equivalent value per call.
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::Misconfiguration(s) => LlmError::Misconfiguration(s.clone()),
        LlmError::Transport(s) => LlmError::Transport(s.clone()),
        LlmError::Auth(s) => LlmError::Auth(s.clone()),
        LlmError::Quota(s) => LlmError::Quota(s.clone()),
        LlmError::Timeout { seconds } => LlmError::Timeout { seconds: *seconds },
        LlmError::EmptyResponse => LlmError::EmptyResponse,
        LlmError::Unsupported(s) => LlmError::Unsupported(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn inv(task: &str) -> LlmInvocation {
        LlmInvocation::new(
            "novacoin",
            task,
            "",
            Duration::from_secs(1),
            vec![Message::user("prompt text")],
        )
    }

    #[tokio::test]
    async fn unscripted_tasks_get_stub_bodies() {
        let backend = ScriptedBackend::new();
        let result = backend.invoke(inv("whitepaper")).await.unwrap();
        assert_eq!(result.raw_response, "whitepaper stub for novacoin");
    }

    #[tokio::test]
    async fn echo_includes_prompt_text() {
        let backend = ScriptedBackend::new().with_prompt_echo("node-setup");
        let result = backend.invoke(inv("node-setup")).await.unwrap();
        assert!(result.raw_response.contains("prompt text"));
    }

    #[tokio::test]
    async fn failures_are_scripted() {
        let backend =
            ScriptedBackend::new().with_failure("logo", LlmError::EmptyResponse);
        let err = backend.invoke(inv("logo")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn invocation_order_is_recorded() {
        let backend = ScriptedBackend::new();
        backend.invoke(inv("a")).await.unwrap();
        backend.invoke(inv("b")).await.unwrap();
        assert_eq!(backend.invocation_order(), vec!["a", "b"]);
    }
}

//! One-shot advisory commands
//!
//! `ask`, `explain`, and `suggest` share a single backend invocation
//! shape: build a prompt, call the model once, print the answer. They
//! reuse the generation backend but run outside the task DAG.

use std::sync::Arc;
use std::time::Duration;

use coinforge_llm::{LlmBackend, LlmInvocation, Message};
use coinforge_store::Project;
use coinforge_utils::error::CoinforgeError;

const SYSTEM_PROMPT: &str = "\
You are a launch advisor for a cryptocurrency project. Answer directly
and concretely, grounded in the project facts you are given. When the
question is outside the project's scope, say so briefly.";

/// What the user wants suggested for their launch plan.
#[derive(Debug, Clone)]
pub enum Suggestion {
    /// Draft a value for an empty plan field.
    Generate { field: String },
    /// Improve an existing value.
    Improve { field: String, current: String },
}

pub struct Advisor {
    backend: Arc<dyn LlmBackend>,
    model: String,
    timeout: Duration,
}

impl Advisor {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            model: String::new(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer a question about a saved project, with the project's plan
    /// and generated artifacts as context.
    ///
    /// # Errors
    ///
    /// Returns `CoinforgeError::Llm` on backend failures.
    pub async fn ask_project(
        &self,
        project: &Project,
        question: &str,
    ) -> Result<String, CoinforgeError> {
        let plan = toml::to_string(&project.params)
            .unwrap_or_else(|_| format!("name = {:?}", project.params.name));

        let mut context = format!(
            "Launch plan for {name}:\n{plan}",
            name = project.params.name,
        );
        // The narrative artifacts carry the most answerable context;
        // technical payloads are included in full since they are short.
        for field in ["whitepaper", "tokenomics", "genesis_block", "network_config"] {
            if let Some(payload) = project.result.get(field) {
                let excerpt: String = payload.chars().take(4000).collect();
                context.push_str(&format!("\n\n--- {field} ---\n{excerpt}"));
            }
        }

        let prompt = format!("{context}\n\nQuestion: {question}");
        self.invoke(&project.params.name, "ask", prompt).await
    }

    /// Explain a cryptocurrency concept in plain language.
    ///
    /// # Errors
    ///
    /// Returns `CoinforgeError::Llm` on backend failures.
    pub async fn explain(&self, concept: &str) -> Result<String, CoinforgeError> {
        let prompt = format!(
            "Explain the cryptocurrency concept {concept:?} for someone
preparing to launch their own chain. Cover what it is, why it matters
for a new project, and one common misconception. Keep it under 300
words."
        );
        self.invoke("coinforge", "explain", prompt).await
    }

    /// Suggest content for a launch plan field.
    ///
    /// # Errors
    ///
    /// Returns `CoinforgeError::Llm` on backend failures.
    pub async fn suggest(&self, suggestion: &Suggestion) -> Result<String, CoinforgeError> {
        let prompt = match suggestion {
            Suggestion::Generate { field } => format!(
                "Draft a strong value for the {field:?} field of a cryptocurrency
launch plan. Respond with the field value only, ready to paste into a
TOML plan file."
            ),
            Suggestion::Improve { field, current } => format!(
                "Improve this value for the {field:?} field of a cryptocurrency
launch plan. Keep the intent, sharpen the wording. Respond with the
improved value only.

Current value:
{current}"
            ),
        };
        self.invoke("coinforge", "suggest", prompt).await
    }

    async fn invoke(
        &self,
        project: &str,
        task: &str,
        prompt: String,
    ) -> Result<String, CoinforgeError> {
        let invocation = LlmInvocation::new(
            project,
            task,
            self.model.clone(),
            self.timeout,
            vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
        );
        let result = self.backend.invoke(invocation).await?;
        Ok(result.raw_response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinforge_llm::ScriptedBackend;
    use coinforge_params::ProjectParameters;
    use coinforge_store::ProjectId;
    use coinforge_task_api::GenerationResult;

    fn advisor_with(backend: ScriptedBackend) -> Advisor {
        Advisor::new(Arc::new(backend), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn ask_embeds_project_context() {
        let backend = ScriptedBackend::new().with_prompt_echo("ask");
        let params = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        let mut result = GenerationResult::new();
        result.insert("whitepaper", "# NovaCoin whitepaper body");
        let project = Project::from_run(
            ProjectId::new("novacoin").unwrap(),
            "alice",
            params,
            result,
        );

        let answer = advisor_with(backend)
            .ask_project(&project, "What is the block reward?")
            .await
            .unwrap();
        assert!(answer.contains("NovaCoin whitepaper body"));
        assert!(answer.contains("What is the block reward?"));
    }

    #[tokio::test]
    async fn explain_mentions_the_concept() {
        let backend = ScriptedBackend::new().with_prompt_echo("explain");
        let answer = advisor_with(backend).explain("halving").await.unwrap();
        assert!(answer.contains("halving"));
    }

    #[tokio::test]
    async fn suggest_improve_carries_current_value() {
        let backend = ScriptedBackend::new().with_prompt_echo("suggest");
        let answer = advisor_with(backend)
            .suggest(&Suggestion::Improve {
                field: "mission_statement".to_string(),
                current: "we make coin".to_string(),
            })
            .await
            .unwrap();
        assert!(answer.contains("we make coin"));
    }
}

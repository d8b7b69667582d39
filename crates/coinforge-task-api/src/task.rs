//! Task identity and the generation task contract

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use coinforge_params::ProjectParameters;
use coinforge_utils::error::TaskError;

/// Identifier for each generation task in the launch pipeline.
///
/// The string form (kebab-case) is used in status output, backend
/// invocations, and persisted results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum TaskId {
    Whitepaper,
    Tokenomics,
    CommunityStrategy,
    Logo,
    GenesisBlock,
    NetworkConfig,
    CompilationGuide,
    PitchDeck,
    SocialCampaign,
    LandingPage,
    NodeSetup,
}

impl TaskId {
    /// Stable kebab-case name, matching the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whitepaper => "whitepaper",
            Self::Tokenomics => "tokenomics",
            Self::CommunityStrategy => "community-strategy",
            Self::Logo => "logo",
            Self::GenesisBlock => "genesis-block",
            Self::NetworkConfig => "network-config",
            Self::CompilationGuide => "compilation-guide",
            Self::PitchDeck => "pitch-deck",
            Self::SocialCampaign => "social-campaign",
            Self::LandingPage => "landing-page",
            Self::NodeSetup => "node-setup",
        }
    }

    /// Human-readable label for status displays.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Whitepaper => "Whitepaper",
            Self::Tokenomics => "Tokenomics model",
            Self::CommunityStrategy => "Community strategy",
            Self::Logo => "Logo",
            Self::GenesisBlock => "Genesis block",
            Self::NetworkConfig => "Network configuration",
            Self::CompilationGuide => "Compilation guide",
            Self::PitchDeck => "Pitch deck",
            Self::SocialCampaign => "Social campaign",
            Self::LandingPage => "Landing page",
            Self::NodeSetup => "Node setup guide",
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outputs of completed upstream tasks, keyed by task.
///
/// Handed to a dependent task when building its prompt. The orchestrator
/// guarantees every declared dependency is present before the task runs.
#[derive(Debug, Clone, Default)]
pub struct UpstreamOutputs {
    outputs: BTreeMap<TaskId, String>,
}

impl UpstreamOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: TaskId, output: impl Into<String>) {
        self.outputs.insert(task, output.into());
    }

    #[must_use]
    pub fn get(&self, task: TaskId) -> Option<&str> {
        self.outputs.get(&task).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, task: TaskId) -> bool {
        self.outputs.contains_key(&task)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Aggregate output of a generation run: one entry per successful task,
/// keyed by the task's output field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResult {
    fields: BTreeMap<String, String>,
}

impl GenerationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, payload: impl Into<String>) {
        self.fields.insert(field.into(), payload.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Contract implemented by each generation task.
///
/// Tasks are stateless; everything they need arrives through the launch
/// plan and upstream outputs, and everything they produce leaves through
/// the parsed payload.
pub trait GenerationTask: Send + Sync {
    /// Identity of this task.
    fn id(&self) -> TaskId;

    /// Upstream tasks whose outputs this task's prompt consumes.
    ///
    /// A task with dependencies is dispatched only after every listed
    /// task has succeeded; if any fails, this task is never dispatched.
    fn deps(&self) -> &'static [TaskId] {
        &[]
    }

    /// Name of the result field this task's payload is stored under.
    fn output_field(&self) -> &'static str;

    /// Build the full prompt from the launch plan and upstream outputs.
    ///
    /// Only tasks named in [`deps`](Self::deps) appear in `upstream`.
    fn prompt(&self, params: &ProjectParameters, upstream: &UpstreamOutputs) -> String;

    /// Validate the raw model response into the stored payload.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::SchemaMismatch` when the response does not
    /// match the task's declared output shape and `TaskError::EmptyPayload`
    /// when nothing usable remains after cleanup.
    fn parse(&self, raw: &str) -> Result<String, TaskError>;
}

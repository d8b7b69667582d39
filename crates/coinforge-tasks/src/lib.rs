//! The generation tasks that make up a launch run
//!
//! Ten root tasks draw only on the launch plan; the node setup guide
//! depends on the three technical artifacts. [`default_tasks`] returns
//! the full set in a stable order.

mod content;
mod prompts;
mod technical;
mod visual;

use std::sync::Arc;

use coinforge_task_api::GenerationTask;

pub use content::{
    CommunityStrategy, LandingPage, PitchDeck, SocialCampaign, Tokenomics, Whitepaper,
};
pub use technical::{CompilationGuide, GenesisBlock, NetworkConfig, NodeSetup};
pub use visual::Logo;

/// All launch tasks in declaration order. Dispatch order is decided by
/// the orchestrator from each task's dependencies, not by position here.
#[must_use]
pub fn default_tasks() -> Vec<Arc<dyn GenerationTask>> {
    vec![
        Arc::new(Whitepaper),
        Arc::new(Tokenomics),
        Arc::new(CommunityStrategy),
        Arc::new(Logo),
        Arc::new(GenesisBlock),
        Arc::new(NetworkConfig),
        Arc::new(CompilationGuide),
        Arc::new(PitchDeck),
        Arc::new(SocialCampaign),
        Arc::new(LandingPage),
        Arc::new(NodeSetup),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinforge_task_api::TaskId;
    use std::collections::BTreeSet;
    use strum::IntoEnumIterator;

    #[test]
    fn default_set_covers_every_task_id_once() {
        let tasks = default_tasks();
        let ids: BTreeSet<TaskId> = tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids.len(), tasks.len(), "duplicate task ids");
        let all: BTreeSet<TaskId> = TaskId::iter().collect();
        assert_eq!(ids, all, "task set does not match the id space");
    }

    #[test]
    fn output_fields_are_unique() {
        let tasks = default_tasks();
        let fields: BTreeSet<&str> = tasks.iter().map(|t| t.output_field()).collect();
        assert_eq!(fields.len(), tasks.len());
    }

    #[test]
    fn dependencies_reference_root_tasks_only() {
        // The graph is depth two: dependencies must themselves be dependency-free.
        let tasks = default_tasks();
        let by_id = |id: TaskId| {
            tasks
                .iter()
                .find(|t| t.id() == id)
                .expect("dependency names a known task")
        };
        for task in &tasks {
            for dep in task.deps() {
                assert!(
                    by_id(*dep).deps().is_empty(),
                    "{} depends on {}, which is not a root task",
                    task.id(),
                    dep
                );
            }
        }
    }

    #[test]
    fn only_node_setup_has_dependencies() {
        for task in default_tasks() {
            if task.id() == TaskId::NodeSetup {
                assert_eq!(task.deps().len(), 3);
            } else {
                assert!(task.deps().is_empty(), "{} should be a root task", task.id());
            }
        }
    }
}

//! Terminal checklist renderer for generation runs
//!
//! Prints one line per status transition to stderr, so stdout stays
//! reserved for machine-readable output. The initial burst of pending
//! updates doubles as the upfront checklist.

use coinforge_task_api::{StatusObserver, TaskState, TaskUpdate};
use coinforge_utils::logging::use_color;

pub struct ChecklistObserver {
    color: bool,
}

impl Default for ChecklistObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecklistObserver {
    #[must_use]
    pub fn new() -> Self {
        Self { color: use_color() }
    }

    fn tag(&self, state: TaskState) -> String {
        let (plain, colored) = match state {
            TaskState::Pending => ("[ .. ]", "\x1b[2m[ .. ]\x1b[0m"),
            TaskState::Running => ("[ RUN]", "\x1b[33m[ RUN]\x1b[0m"),
            TaskState::Success => ("[ OK ]", "\x1b[32m[ OK ]\x1b[0m"),
            TaskState::Error => ("[FAIL]", "\x1b[31m[FAIL]\x1b[0m"),
        };
        if self.color { colored } else { plain }.to_string()
    }
}

impl StatusObserver for ChecklistObserver {
    fn task_update(&self, update: &TaskUpdate) {
        eprintln!("{} {}", self.tag(update.status.state), update.task.label());
        if let Some(error) = &update.status.error {
            eprintln!("       {error}");
        }
    }
}

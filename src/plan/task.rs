//! Task and plan types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One unit of work destined to become a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Issue title (non-empty).
    pub title: String,
    /// Issue body; may be empty.
    #[serde(default)]
    pub body: String,
    /// Labels from the recognized vocabulary.
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Tracker logins to assign.
    #[serde(default)]
    pub assignees: BTreeSet<String>,
    /// Whether an automated agent may pick this task up once unblocked.
    #[serde(default = "default_ai_ready")]
    pub ai_ready: bool,
    /// 1-based steps that must be completed before this task may start.
    #[serde(default)]
    pub dependencies: BTreeSet<usize>,
}

fn default_ai_ready() -> bool {
    true
}

/// An ordered sequence of tasks; step `n` is `tasks[n - 1]`.
///
/// A plan produced by [`PlanBuilder`](super::PlanBuilder) is structurally
/// valid. A plan deserialized from an artifact is not trusted until the
/// sequencer has ordered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    tasks: Vec<Task>,
}

impl Plan {
    pub(crate) fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the task at a 1-based step index.
    #[must_use]
    pub fn task(&self, step: usize) -> Option<&Task> {
        step.checked_sub(1).and_then(|i| self.tasks.get(i))
    }

    /// Iterates `(step, task)` pairs in received order.
    pub fn steps(&self) -> impl Iterator<Item = (usize, &Task)> {
        self.tasks.iter().enumerate().map(|(i, task)| (i + 1, task))
    }

    /// All tasks in received order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

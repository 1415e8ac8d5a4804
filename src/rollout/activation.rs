//! Staged activation: which task may receive the trigger label, and when.
//!
//! At most one automated task is in flight. The designated task is the first
//! `ai_ready` step in topological order that is neither triggered nor
//! completed; it is triggered only once all of its dependencies are
//! completed and nothing else is in flight. The activator decides; the
//! executor applies the transition.

use serde::{Deserialize, Serialize};

use super::record::RolloutRecord;
use crate::error::PlanError;
use crate::plan::Plan;
use crate::sequence::topological_order;

/// Lifecycle of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// No issue yet.
    PendingCreation,
    /// Issue exists without the trigger label.
    CreatedUntriggered,
    /// Trigger label applied; the agent owns it.
    Triggered,
    /// The issue was closed.
    Completed,
}

impl ActivationState {
    /// Lowercase name used in tables and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingCreation => "pending_creation",
            Self::CreatedUntriggered => "created_untriggered",
            Self::Triggered => "triggered",
            Self::Completed => "completed",
        }
    }
}

/// Trigger policy over a plan and its topological order.
#[derive(Debug)]
pub struct StagedActivator<'p> {
    plan: &'p Plan,
    order: Vec<usize>,
}

impl<'p> StagedActivator<'p> {
    /// Uses a precomputed topological order of `plan`.
    #[must_use]
    pub fn new(plan: &'p Plan, order: Vec<usize>) -> Self {
        Self { plan, order }
    }

    /// Orders `plan` and builds the activator.
    ///
    /// # Errors
    ///
    /// Returns the sequencer's error for a plan that cannot be ordered.
    pub fn for_plan(plan: &'p Plan) -> Result<Self, PlanError> {
        Ok(Self::new(plan, topological_order(plan)?))
    }

    /// Topological order this activator follows.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// First `ai_ready` step in order that is neither triggered nor completed.
    #[must_use]
    pub fn designated(&self, record: &RolloutRecord) -> Option<usize> {
        self.order.iter().copied().find(|&step| {
            self.plan.task(step).is_some_and(|t| t.ai_ready)
                && !matches!(
                    record.state(step),
                    ActivationState::Triggered | ActivationState::Completed
                )
        })
    }

    /// Whether `step`, just created, should be triggered right away.
    #[must_use]
    pub fn on_created(&self, step: usize, record: &RolloutRecord) -> bool {
        let decision = self.designated(record) == Some(step) && self.ready(step, record);
        tracing::debug!(step, decision, "activation decision on creation");
        decision
    }

    /// The step to trigger after completions were observed, if any.
    #[must_use]
    pub fn on_completion(&self, record: &RolloutRecord) -> Option<usize> {
        let step = self.designated(record)?;
        let next = (record.state(step) == ActivationState::CreatedUntriggered
            && self.ready(step, record))
        .then_some(step);
        tracing::debug!(designated = step, ?next, "activation decision on completion");
        next
    }

    fn ready(&self, step: usize, record: &RolloutRecord) -> bool {
        let Some(task) = self.plan.task(step) else { return false };
        record.in_flight().is_empty()
            && task
                .dependencies
                .iter()
                .all(|&d| record.state(d) == ActivationState::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::plan::Task;

    fn plan(tasks: &[(bool, &[usize])]) -> Plan {
        Plan::new(
            tasks
                .iter()
                .enumerate()
                .map(|(i, (ai_ready, deps))| Task {
                    title: format!("task {}", i + 1),
                    body: String::new(),
                    labels: BTreeSet::new(),
                    assignees: BTreeSet::new(),
                    ai_ready: *ai_ready,
                    dependencies: deps.iter().copied().collect(),
                })
                .collect(),
        )
    }

    fn record() -> RolloutRecord {
        RolloutRecord::new("run", chrono::Utc::now())
    }

    #[test]
    fn first_ai_ready_root_triggers_on_creation() {
        let p = plan(&[(true, &[]), (true, &[1])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();

        r.mark_created(1, 10);
        assert!(activator.on_created(1, &r));
        r.set_state(1, ActivationState::Triggered);

        r.mark_created(2, 11);
        assert!(!activator.on_created(2, &r));
        assert_eq!(activator.on_completion(&r), None, "step 1 still in flight");

        r.set_state(1, ActivationState::Completed);
        assert_eq!(activator.on_completion(&r), Some(2));
    }

    #[test]
    fn human_task_first_defers_to_next_ai_ready() {
        let p = plan(&[(false, &[]), (true, &[])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        r.mark_created(1, 10);
        assert!(!activator.on_created(1, &r));
        r.mark_created(2, 11);
        assert_eq!(activator.designated(&r), Some(2));
        assert!(activator.on_created(2, &r));
    }

    #[test]
    fn designated_task_with_open_dependency_waits() {
        // Step 2 is the only ai_ready task but depends on a human task.
        let p = plan(&[(false, &[]), (true, &[1]), (false, &[])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        assert_eq!(activator.order(), &[1, 3, 2]);
        for (step, issue) in [(1, 10), (3, 12), (2, 11)] {
            r.mark_created(step, issue);
        }
        assert_eq!(activator.designated(&r), Some(2));
        assert!(!activator.on_created(2, &r));
        assert_eq!(activator.on_completion(&r), None);

        r.set_state(1, ActivationState::Completed);
        assert_eq!(activator.on_completion(&r), Some(2));
    }

    #[test]
    fn later_ready_task_does_not_jump_the_designated_one() {
        let p = plan(&[(true, &[]), (true, &[])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        r.mark_created(2, 11);
        assert!(!activator.on_created(2, &r), "step 1 is designated even before creation");
    }

    #[test]
    fn never_returns_human_tasks() {
        let p = plan(&[(true, &[]), (false, &[1])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        r.mark_created(1, 10);
        r.mark_created(2, 11);
        r.set_state(1, ActivationState::Completed);
        assert_eq!(activator.designated(&r), None);
        assert_eq!(activator.on_completion(&r), None);
    }

    #[test]
    fn uncreated_designated_task_blocks_completion_trigger() {
        let p = plan(&[(true, &[]), (true, &[])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        r.mark_failed(1, "HTTP 502");
        r.mark_created(2, 11);
        assert_eq!(activator.designated(&r), Some(1));
        assert!(!activator.on_created(2, &r));
        assert_eq!(activator.on_completion(&r), None);
    }

    #[test]
    fn at_most_one_trigger_per_completion() {
        let p = plan(&[(true, &[]), (true, &[1]), (true, &[1])]);
        let activator = StagedActivator::for_plan(&p).unwrap();
        let mut r = record();
        for step in 1..=3 {
            r.mark_created(step, 10 + step as u64);
        }
        r.set_state(1, ActivationState::Completed);
        assert_eq!(activator.on_completion(&r), Some(2));
        r.set_state(2, ActivationState::Triggered);
        assert_eq!(activator.on_completion(&r), None);
        r.set_state(2, ActivationState::Completed);
        assert_eq!(activator.on_completion(&r), Some(3));
    }

    #[test]
    fn state_names_match_json() {
        for state in [
            ActivationState::PendingCreation,
            ActivationState::CreatedUntriggered,
            ActivationState::Triggered,
            ActivationState::Completed,
        ] {
            assert_eq!(serde_json::to_value(state).unwrap(), state.as_str());
        }
    }
}

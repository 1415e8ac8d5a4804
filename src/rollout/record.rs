//! Rollout record (persisted state) and per-run reports.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activation::ActivationState;

/// What the executor knows about one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Tracker issue number once created.
    #[serde(default)]
    pub issue: Option<u64>,
    /// Activation state.
    pub state: ActivationState,
    /// Last creation or trigger failure, kept for `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for RecordEntry {
    fn default() -> Self {
        Self { issue: None, state: ActivationState::PendingCreation, last_error: None }
    }
}

/// Persisted rollout state, keyed by 1-based step.
///
/// Issue numbers are append-only: once a step has one it is never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutRecord {
    /// Identifier of the run that started this rollout.
    pub run_id: String,
    /// When the rollout started.
    pub started_at: DateTime<Utc>,
    /// Per-step state; steps never touched are absent.
    #[serde(default)]
    pub entries: BTreeMap<usize, RecordEntry>,
}

impl RolloutRecord {
    /// An empty record.
    #[must_use]
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self { run_id: run_id.into(), started_at, entries: BTreeMap::new() }
    }

    /// State of `step`; absent steps are `PendingCreation`.
    #[must_use]
    pub fn state(&self, step: usize) -> ActivationState {
        self.entries.get(&step).map_or(ActivationState::PendingCreation, |e| e.state)
    }

    /// Issue number of `step`, if created.
    #[must_use]
    pub fn issue(&self, step: usize) -> Option<u64> {
        self.entries.get(&step).and_then(|e| e.issue)
    }

    /// Records a freshly created issue as `CreatedUntriggered`.
    ///
    /// Returns `false` and leaves the entry alone if the step already had an
    /// issue number.
    pub fn mark_created(&mut self, step: usize, issue: u64) -> bool {
        let entry = self.entries.entry(step).or_default();
        if entry.issue.is_some() {
            return false;
        }
        entry.issue = Some(issue);
        entry.state = ActivationState::CreatedUntriggered;
        entry.last_error = None;
        true
    }

    /// Records a failure against `step` without changing its state.
    pub fn mark_failed(&mut self, step: usize, error: impl Into<String>) {
        self.entries.entry(step).or_default().last_error = Some(error.into());
    }

    /// Sets the state of a created step.
    pub fn set_state(&mut self, step: usize, state: ActivationState) {
        let entry = self.entries.entry(step).or_default();
        entry.state = state;
        if state == ActivationState::Triggered {
            entry.last_error = None;
        }
    }

    /// Steps currently `Triggered`, ascending.
    #[must_use]
    pub fn in_flight(&self) -> BTreeSet<usize> {
        self.steps_in(ActivationState::Triggered)
    }

    /// Steps `Completed`, ascending.
    #[must_use]
    pub fn completed(&self) -> BTreeSet<usize> {
        self.steps_in(ActivationState::Completed)
    }

    /// `(step, issue)` for every created step that is not yet completed.
    #[must_use]
    pub fn open_issues(&self) -> Vec<(usize, u64)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.state != ActivationState::Completed)
            .filter_map(|(&step, e)| e.issue.map(|issue| (step, issue)))
            .collect()
    }

    fn steps_in(&self, state: ActivationState) -> BTreeSet<usize> {
        self.entries.iter().filter(|(_, e)| e.state == state).map(|(&s, _)| s).collect()
    }
}

/// What happened to one step during `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Issue created; `triggered` when the trigger label was added.
    Created {
        /// New issue number.
        issue: u64,
        /// Whether the trigger label was applied.
        triggered: bool,
        /// Set when the activator asked for a trigger and `add_label` failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trigger_error: Option<String>,
    },
    /// The tracker refused the issue.
    CreationFailed {
        /// Tracker error text.
        error: String,
    },
    /// Nothing was done for this step.
    Skipped {
        /// Existing issue, if any.
        issue: Option<u64>,
        /// Why it was skipped.
        reason: String,
    },
}

/// Per-step entry of a [`RolloutReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based step.
    pub step: usize,
    /// Task title (before `title_format`).
    pub title: String,
    /// Outcome.
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Result of one `execute` call, in topological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutReport {
    /// One entry per step.
    pub steps: Vec<StepReport>,
}

impl RolloutReport {
    /// Number of issues created in this run.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Created { .. }))
    }

    /// Number of steps whose creation failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::CreationFailed { .. }))
    }

    /// Number of steps skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Skipped { .. }))
    }

    /// The step that received the trigger label, if any.
    #[must_use]
    pub fn triggered(&self) -> Option<usize> {
        self.steps
            .iter()
            .find(|s| matches!(s.outcome, StepOutcome::Created { triggered: true, .. }))
            .map(|s| s.step)
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Result of one `advance` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceReport {
    /// Steps newly marked completed by this call.
    pub newly_completed: Vec<usize>,
    /// `(step, issue)` that received the trigger label.
    pub triggered: Option<(usize, u64)>,
    /// Step whose trigger was attempted and failed, with the error.
    pub trigger_error: Option<(usize, String)>,
}

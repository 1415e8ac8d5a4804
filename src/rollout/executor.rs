//! Rollout executor: creates issues in dependency order and applies the
//! activator's trigger decisions.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use super::activation::{ActivationState, StagedActivator};
use super::record::{AdvanceReport, RolloutRecord, RolloutReport, StepOutcome, StepReport};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::{PlanError, TrackerError};
use crate::plan::{Plan, Task};
use crate::ports::tracker::NewIssue;
use crate::store::ArtifactStore;

/// Drives the tracker for one plan.
///
/// Sequential by construction: one tracker call at a time, in topological
/// order.
pub struct RolloutExecutor<'a> {
    ctx: &'a ServiceContext,
    config: &'a Config,
    store: Option<&'a ArtifactStore<'a>>,
}

impl<'a> RolloutExecutor<'a> {
    /// An executor that does not persist the record.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a Config) -> Self {
        Self { ctx, config, store: None }
    }

    /// Persists the record through `store` after every change.
    #[must_use]
    pub fn with_store(mut self, store: &'a ArtifactStore<'a>) -> Self {
        self.store = Some(store);
        self
    }

    /// Starts a fresh record stamped by the clock and id ports.
    #[must_use]
    pub fn start_record(&self) -> RolloutRecord {
        RolloutRecord::new(self.ctx.id_gen.generate_id(), self.ctx.clock.now())
    }

    /// Creates an issue for every step that has none yet.
    ///
    /// Steps already holding an issue number in `record` are reported as
    /// skipped, which is how an interrupted rollout resumes. A creation
    /// failure is reported and the run moves on to the next step.
    ///
    /// # Errors
    ///
    /// Returns the sequencer's error before any tracker call when the plan
    /// cannot be ordered.
    pub fn execute(
        &self,
        plan: &Plan,
        record: &mut RolloutRecord,
    ) -> Result<RolloutReport, PlanError> {
        let activator = StagedActivator::for_plan(plan)?;
        let mut report = RolloutReport::default();

        for &step in activator.order() {
            let Some(task) = plan.task(step) else { continue };
            let outcome = if let Some(issue) = record.issue(step) {
                tracing::info!(step, issue, "already created, skipping");
                StepOutcome::Skipped { issue: Some(issue), reason: "already created".into() }
            } else {
                let outcome = self.create_step(&activator, plan, step, task, record);
                self.persist(record);
                outcome
            };
            report.steps.push(StepReport { step, title: task.title.clone(), outcome });
        }

        tracing::info!(
            created = report.created(),
            failed = report.failed(),
            skipped = report.skipped(),
            "rollout finished"
        );
        Ok(report)
    }

    fn create_step(
        &self,
        activator: &StagedActivator<'_>,
        plan: &Plan,
        step: usize,
        task: &Task,
        record: &mut RolloutRecord,
    ) -> StepOutcome {
        let issue = self.new_issue(plan, step, task, record);
        let number = match self.ctx.tracker.create_issue(&issue) {
            Ok(number) => number,
            Err(e) => {
                tracing::warn!(step, error = %e, "issue creation failed");
                record.mark_failed(step, e.to_string());
                return StepOutcome::CreationFailed { error: e.to_string() };
            }
        };
        record.mark_created(step, number);
        tracing::info!(step, issue = number, "issue created");

        if !activator.on_created(step, record) {
            return StepOutcome::Created { issue: number, triggered: false, trigger_error: None };
        }
        match self.trigger(record, step, number) {
            Ok(()) => StepOutcome::Created { issue: number, triggered: true, trigger_error: None },
            Err(e) => StepOutcome::Created {
                issue: number,
                triggered: false,
                trigger_error: Some(e.to_string()),
            },
        }
    }

    /// Marks observed completions, then triggers at most one task.
    ///
    /// Steps in `completed` without an issue are ignored.
    ///
    /// # Errors
    ///
    /// Returns the sequencer's error when the plan cannot be ordered.
    pub fn advance(
        &self,
        plan: &Plan,
        record: &mut RolloutRecord,
        completed: &BTreeSet<usize>,
    ) -> Result<AdvanceReport, PlanError> {
        let activator = StagedActivator::for_plan(plan)?;
        let mut report = AdvanceReport::default();

        for &step in completed {
            if record.issue(step).is_some() && record.state(step) != ActivationState::Completed {
                record.set_state(step, ActivationState::Completed);
                report.newly_completed.push(step);
            }
        }

        if let Some(step) = activator.on_completion(record) {
            if let Some(issue) = record.issue(step) {
                match self.trigger(record, step, issue) {
                    Ok(()) => report.triggered = Some((step, issue)),
                    Err(e) => report.trigger_error = Some((step, e.to_string())),
                }
            }
        }

        if !report.newly_completed.is_empty()
            || report.triggered.is_some()
            || report.trigger_error.is_some()
        {
            self.persist(record);
        }
        Ok(report)
    }

    /// Steps whose issues the tracker reports as closed.
    ///
    /// Only created, not-yet-completed steps are queried.
    ///
    /// # Errors
    ///
    /// Returns the first tracker failure.
    pub fn observe_completions(
        &self,
        record: &RolloutRecord,
    ) -> Result<BTreeSet<usize>, TrackerError> {
        let mut closed = BTreeSet::new();
        for (step, issue) in record.open_issues() {
            let detail = self.ctx.tracker.view_issue(issue)?;
            if detail.is_closed() {
                tracing::debug!(step, issue, "issue closed");
                closed.insert(step);
            }
        }
        Ok(closed)
    }

    fn trigger(
        &self,
        record: &mut RolloutRecord,
        step: usize,
        issue: u64,
    ) -> Result<(), TrackerError> {
        match self.ctx.tracker.add_label(issue, &self.config.trigger_label) {
            Ok(()) => {
                record.set_state(step, ActivationState::Triggered);
                tracing::info!(step, issue, label = %self.config.trigger_label, "task triggered");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(step, issue, error = %e, "trigger label failed");
                record.mark_failed(step, e.to_string());
                Err(e)
            }
        }
    }

    fn new_issue(&self, plan: &Plan, step: usize, task: &Task, record: &RolloutRecord) -> NewIssue {
        let mut body = task.body.clone();
        if !task.dependencies.is_empty() {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str("## Dependencies\n");
            for &dep in &task.dependencies {
                let title = plan.task(dep).map_or("", |t| t.title.as_str());
                let _ = match record.issue(dep) {
                    Some(issue) => writeln!(body, "- #{issue} {title}"),
                    None => writeln!(body, "- step {dep} (not created) {title}"),
                };
            }
        }

        NewIssue {
            title: self.config.issue_title(step, &task.title),
            body,
            labels: task
                .labels
                .iter()
                .filter(|l| **l != self.config.trigger_label)
                .cloned()
                .collect(),
            assignees: task.assignees.iter().cloned().collect(),
        }
    }

    fn persist(&self, record: &RolloutRecord) {
        if let Some(store) = self.store {
            if let Err(e) = store.save_record(record) {
                tracing::warn!(error = %e, "could not persist rollout record");
            }
        }
    }
}

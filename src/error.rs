//! Error taxonomy for planning, rollout, and validation.

use thiserror::Error;

/// Errors raised while turning planner output into a validated [`Plan`].
///
/// All variants are fatal: they are raised before any tracker mutation.
///
/// [`Plan`]: crate::plan::Plan
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The planner output contained no recoverable JSON task array.
    #[error("planner output is not a JSON task array: {0}")]
    MalformedPlan(String),

    /// A candidate task is missing a required field or has the wrong shape.
    #[error("step {step}: invalid task: {reason}")]
    InvalidTask {
        /// 1-based step index of the offending task.
        step: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A task carries a label outside the recognized vocabulary.
    #[error("step {step}: unknown label '{label}'")]
    UnknownLabel {
        /// 1-based step index of the offending task.
        step: usize,
        /// The unrecognized label.
        label: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle through steps {}", format_steps(.cycle))]
    CyclicDependency {
        /// Steps on the cycle (or stuck behind it), in discovery order.
        cycle: Vec<usize>,
    },

    /// A task depends on a step that does not exist.
    #[error("step {step} depends on step {dependency}, which is not in the plan")]
    UnsatisfiableDependency {
        /// 1-based step index of the dependent task.
        step: usize,
        /// The dangling dependency reference.
        dependency: usize,
    },
}

fn format_steps(steps: &[usize]) -> String {
    steps.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

/// A failed call to the issue tracker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("tracker {operation} failed: {message}")]
pub struct TrackerError {
    /// The tracker operation that failed (e.g. `create_issue`).
    pub operation: String,
    /// Underlying error text.
    pub message: String,
}

impl TrackerError {
    /// Creates a tracker error for the given operation.
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self { operation: operation.into(), message: message.into() }
    }
}

/// A failed call to the language model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("model call failed: {0}")]
pub struct LlmError(pub String);

/// Errors from asking the planner model for a plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanningError {
    /// The planner model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The planner answered with something that is not a valid plan.
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Errors surfaced by the validation correlator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidateError {
    /// Fetching issue or pull request data failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// The verdict model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),
}

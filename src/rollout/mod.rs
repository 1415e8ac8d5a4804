//! Rollout: turning a plan into tracker issues with staged activation.

pub mod activation;
pub mod executor;
pub mod record;

pub use activation::{ActivationState, StagedActivator};
pub use executor::RolloutExecutor;
pub use record::{AdvanceReport, RecordEntry, RolloutRecord, RolloutReport, StepOutcome, StepReport};

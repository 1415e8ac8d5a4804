//! `stagger advance` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::rollout::{AdvanceReport, RolloutExecutor};
use crate::store::ArtifactStore;

/// Execute the `advance` command.
///
/// Asks the tracker which open issues have been closed, marks those steps
/// completed and triggers the next designated task if it became ready.
///
/// # Errors
///
/// Returns an error string if the saved plan or rollout cannot be read, a
/// tracker read fails, or the plan cannot be ordered.
pub fn run(ctx: &ServiceContext, config: &Config) -> Result<(), String> {
    let store = ArtifactStore::new(ctx, &config.artifact_dir);
    let plan = store.load_plan()?;
    let mut record = store
        .load_record()?
        .ok_or_else(|| format!("No rollout found in {}; run `stagger plan` first", store.root().display()))?;

    let executor = RolloutExecutor::new(ctx, config).with_store(&store);
    let completed = executor.observe_completions(&record).map_err(|e| e.to_string())?;
    let report = executor.advance(&plan, &mut record, &completed).map_err(|e| e.to_string())?;
    print!("{}", render(&report));
    Ok(())
}

fn render(report: &AdvanceReport) -> String {
    let mut out = String::new();
    for step in &report.newly_completed {
        out.push_str(&format!("Step {step} completed.\n"));
    }
    match (&report.triggered, &report.trigger_error) {
        (Some((step, issue)), _) => out.push_str(&format!("Triggered step {step} (#{issue}).\n")),
        (None, Some((step, error))) => {
            out.push_str(&format!("Could not trigger step {step}: {error}\n"));
        }
        (None, None) if report.newly_completed.is_empty() => out.push_str("Nothing to advance.\n"),
        (None, None) => {}
    }
    out
}

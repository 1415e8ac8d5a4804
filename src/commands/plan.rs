//! `stagger plan` command.

use std::fmt::Write as _;
use std::io::BufRead;

use super::block_on;
use crate::cli::PlanArgs;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::plan::{plan_from_spec, Plan, PlannerKind};
use crate::rollout::{RolloutExecutor, RolloutReport, StepOutcome};
use crate::sequence::topological_order;
use crate::store::ArtifactStore;

/// Execute the `plan` command.
///
/// Plans the spec (or reloads the saved plan with `--resume`), saves
/// `plan.json`, prints the plan, and unless `--dry-run` creates the issues
/// after confirmation read from `input`.
///
/// # Errors
///
/// Returns an error string if planning fails, an artifact cannot be read or
/// written, or any issue could not be created.
pub fn run(
    ctx: &ServiceContext,
    config: &Config,
    args: &PlanArgs,
    input: &mut dyn BufRead,
) -> Result<(), String> {
    let store = ArtifactStore::new(ctx, &config.artifact_dir);

    let (plan, resumed) = if args.resume {
        let plan = store.load_plan()?;
        let record = store.load_record()?.ok_or_else(|| {
            format!("No rollout to resume in {}", store.root().display())
        })?;
        (plan, Some(record))
    } else {
        if !args.dry_run && store.load_record()?.is_some() {
            return Err(format!(
                "A rollout already exists in {}; use --resume or remove it",
                store.root().display()
            ));
        }
        let Some(spec_path) = &args.spec_path else {
            return Err("A spec path is required".into());
        };
        let spec = ctx
            .fs
            .read_to_string(spec_path)
            .map_err(|e| format!("Failed to read spec {}: {e}", spec_path.display()))?;
        let kind = if args.mock { PlannerKind::Mock } else { PlannerKind::Model };
        let plan = block_on(plan_from_spec(ctx, config, &spec, kind))?.map_err(|e| e.to_string())?;
        let path = store.save_plan(&plan)?;
        print!("{}", render_plan(&plan)?);
        println!("Plan saved to {}", path.display());
        (plan, None)
    };

    if args.dry_run {
        println!("Dry run: no issues created.");
        return Ok(());
    }
    if !args.yes && !confirm(input, &format!("Create {} issue(s)? [y/N] ", plan.len()))? {
        println!("Cancelled. No issues were created.");
        return Ok(());
    }

    let executor = RolloutExecutor::new(ctx, config).with_store(&store);
    let mut record = match resumed {
        Some(record) => record,
        None => executor.start_record(),
    };
    store.save_record(&record)?;
    let report = executor.execute(&plan, &mut record).map_err(|e| e.to_string())?;
    print!("{}", render_report(&report));

    match report.failed() {
        0 => Ok(()),
        n => Err(format!("{n} issue(s) could not be created; rerun with `stagger plan --resume`")),
    }
}

/// Numbered plan listing in rollout order.
///
/// # Errors
///
/// Returns an error if the plan cannot be ordered.
pub fn render_plan(plan: &Plan) -> Result<String, String> {
    let order = topological_order(plan).map_err(|e| e.to_string())?;
    let mut out = format!("Planned {} task(s), in rollout order:\n", plan.len());
    for step in order {
        let Some(task) = plan.task(step) else { continue };
        let marker = if task.ai_ready { "AI-ready" } else { "human review" };
        let _ = write!(out, "{step:>3}. {} [{marker}]", task.title);
        if !task.labels.is_empty() {
            let labels: Vec<&str> = task.labels.iter().map(String::as_str).collect();
            let _ = write!(out, " ({})", labels.join(", "));
        }
        if !task.dependencies.is_empty() {
            let deps: Vec<String> = task.dependencies.iter().map(ToString::to_string).collect();
            let _ = write!(out, " after {}", deps.join(", "));
        }
        out.push('\n');
    }
    Ok(out)
}

/// One line per step followed by totals.
#[must_use]
pub fn render_report(report: &RolloutReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        let _ = match &step.outcome {
            StepOutcome::Created { issue, triggered: true, .. } => {
                writeln!(out, "  created #{issue}: {} (triggered)", step.title)
            }
            StepOutcome::Created { issue, trigger_error: Some(e), .. } => {
                writeln!(out, "  created #{issue}: {} (trigger failed: {e})", step.title)
            }
            StepOutcome::Created { issue, .. } => writeln!(out, "  created #{issue}: {}", step.title),
            StepOutcome::CreationFailed { error } => {
                writeln!(out, "  FAILED step {}: {} ({error})", step.step, step.title)
            }
            StepOutcome::Skipped { issue: Some(issue), reason } => {
                writeln!(out, "  skipped #{issue}: {} ({reason})", step.title)
            }
            StepOutcome::Skipped { issue: None, reason } => {
                writeln!(out, "  skipped step {}: {} ({reason})", step.step, step.title)
            }
        };
    }
    let _ = writeln!(
        out,
        "\n{} created, {} failed, {} skipped.",
        report.created(),
        report.failed(),
        report.skipped()
    );
    out
}

/// Reads one answer; only `y` or `yes` confirms, end of input declines.
fn confirm(input: &mut dyn BufRead, prompt: &str) -> Result<bool, String> {
    print!("{prompt}");
    let _ = std::io::Write::flush(&mut std::io::stdout());
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(|e| format!("Failed to read answer: {e}"))?;
    Ok(read > 0 && matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

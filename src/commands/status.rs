//! `stagger status` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::plan::Plan;
use crate::rollout::RolloutRecord;
use crate::store::ArtifactStore;

/// Execute the `status` command.
///
/// Displays a table of every planned step with its issue number and
/// activation state. Without a rollout every step shows as pending.
///
/// # Errors
///
/// Returns an error string if the saved plan or rollout cannot be read.
pub fn run(ctx: &ServiceContext, config: &Config) -> Result<(), String> {
    let store = ArtifactStore::new(ctx, &config.artifact_dir);
    if !ctx.fs.exists(&store.root().join("plan.json")) {
        println!("No plan found in {}.", store.root().display());
        return Ok(());
    }
    let plan = store.load_plan()?;
    let record = store.load_record()?;
    print!("{}", render_table(&plan, record.as_ref()));
    Ok(())
}

/// Status table, one row per step in step order.
#[must_use]
pub fn render_table(plan: &Plan, record: Option<&RolloutRecord>) -> String {
    let rows: Vec<[String; 5]> = plan
        .steps()
        .map(|(step, task)| {
            let issue = record
                .and_then(|r| r.issue(step))
                .map_or_else(|| "-".to_string(), |n| format!("#{n}"));
            let state = record.map_or("pending_creation", |r| r.state(step).as_str());
            [
                step.to_string(),
                task.title.clone(),
                if task.ai_ready { "yes" } else { "no" }.to_string(),
                issue,
                state.to_string(),
            ]
        })
        .collect();

    let headers = ["STEP", "TITLE", "AI", "ISSUE", "STATE"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let [w0, w1, w2, w3, w4] = widths;

    let mut out = format!(
        "{:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  {:<w4$}\n",
        headers[0], headers[1], headers[2], headers[3], headers[4]
    );
    out.push_str(&format!("{:-<w0$}  {:-<w1$}  {:-<w2$}  {:-<w3$}  {:-<w4$}\n", "", "", "", "", ""));
    for [step, title, ai, issue, state] in &rows {
        out.push_str(&format!("{step:<w0$}  {title:<w1$}  {ai:<w2$}  {issue:<w3$}  {state:<w4$}\n"));
    }

    match record {
        Some(r) => out.push_str(&format!(
            "\n{} step(s), {} completed, rollout {} started {}.\n",
            rows.len(),
            r.completed().len(),
            r.run_id,
            r.started_at.format("%Y-%m-%d %H:%M UTC")
        )),
        None => out.push_str(&format!("\n{} step(s), not rolled out yet.\n", rows.len())),
    }
    out
}

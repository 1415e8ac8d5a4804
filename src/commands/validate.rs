//! `stagger validate` command.

use super::block_on;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::store::ArtifactStore;
use crate::validate::{format_comment, validate_issue, ValidationStatus};

/// Execute the `validate` command.
///
/// Saves `validation_<issue>.json`, comments the verdict on the issue and
/// returns whether it passed.
///
/// # Errors
///
/// Returns an error string if a tracker or model call fails, or the
/// artifact cannot be written.
pub fn run(ctx: &ServiceContext, config: &Config, issue: u64) -> Result<bool, String> {
    let result = block_on(validate_issue(ctx, config, issue))?.map_err(|e| e.to_string())?;

    let store = ArtifactStore::new(ctx, &config.artifact_dir);
    let path = store.save_validation(&result)?;
    ctx.tracker
        .comment_issue(issue, &format_comment(&result))
        .map_err(|e| e.to_string())?;

    match result.pr_number {
        Some(pr) => println!("Issue #{issue} (PR #{pr}): {}", result.status.label()),
        None => println!("Issue #{issue} (no PR): {}", result.status.label()),
    }
    for item in &result.recommendations {
        println!("  - {item}");
    }
    println!("Result saved to {}", path.display());
    Ok(result.status == ValidationStatus::Pass)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::ports::tracker::IssueDetail;
    use crate::test_support::{context_with, FakeTracker, MemFs, ScriptedLlm};

    fn setup(answer: &str) -> (ServiceContext, FakeTracker, MemFs) {
        let tracker = FakeTracker::default();
        tracker.add_issue(IssueDetail {
            number: 42,
            title: "Add export".into(),
            body: String::new(),
            labels: vec![],
            state: "CLOSED".into(),
            assignees: vec![],
            comments: vec![],
        });
        let fs = MemFs::default();
        let mut ctx = context_with(ScriptedLlm::new([Ok(answer.to_string())]));
        ctx.tracker = Box::new(tracker.clone());
        ctx.fs = Box::new(fs.clone());
        (ctx, tracker, fs)
    }

    fn config() -> Config {
        Config { artifact_dir: PathBuf::from("/arts"), ..Config::default() }
    }

    #[test]
    fn verdict_is_saved_and_commented() {
        let (ctx, tracker, fs) = setup("Status: pass\n## Recommendations\n- Add tests");
        let passed = run(&ctx, &config(), 42).unwrap();
        assert!(!passed, "no PR means needs review");

        let saved = fs.get(Path::new("/arts/validation_42.json")).unwrap();
        assert!(saved.contains("\"needs_review\""));
        let comments = tracker.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].0, 42);
        assert!(comments[0].1.contains("**Status**: NEEDS_REVIEW"));
        assert!(comments[0].1.contains("- Add tests"));
    }

    #[test]
    fn tracker_failure_writes_nothing() {
        let (ctx, tracker, fs) = setup("Status: pass");
        let err = run(&ctx, &config(), 7).unwrap_err();
        assert!(err.contains("view_issue"));
        assert!(fs.get(Path::new("/arts/validation_7.json")).is_none());
        assert!(tracker.comments().is_empty());
    }
}

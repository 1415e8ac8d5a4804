//! Validation: correlate an issue with the pull request that closes it and
//! ask the validator model for a verdict.

pub mod verdict;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub use verdict::{classify_verdict, extract_recommendations, truncate_chars};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::{LlmError, ValidateError};
use crate::ports::llm::CompletionRequest;
use crate::ports::tracker::{IssueDetail, PullRequestDetail};

/// Line used in place of PR details when nothing closes the issue.
pub const NO_PR_NOTICE: &str =
    "No PR found - issue may still be open or closed without implementation.";

/// Verdict category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// The work satisfies the issue.
    Pass,
    /// The work does not satisfy the issue.
    Fail,
    /// A human needs to look.
    NeedsReview,
}

impl ValidationStatus {
    /// Uppercase label used in comments.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::NeedsReview => "NEEDS_REVIEW",
        }
    }
}

/// One verdict for one issue; written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Validated issue.
    pub issue_number: u64,
    /// Closing pull request, if one was found.
    pub pr_number: Option<u64>,
    /// Verdict.
    pub status: ValidationStatus,
    /// Truncated model response.
    pub summary: String,
    /// PR facts: counts and check conclusions. Empty without a PR.
    #[serde(default)]
    pub test_results: Map<String, Value>,
    /// Bullet items from the response's recommendations section.
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Validates `issue` end to end, without writing anything.
///
/// Without a closing pull request the status is `NeedsReview` whatever the
/// model says.
///
/// # Errors
///
/// Returns [`ValidateError::Tracker`] for any failed tracker read and
/// [`ValidateError::Llm`] if the model call fails.
pub async fn validate_issue(
    ctx: &ServiceContext,
    config: &Config,
    issue: u64,
) -> Result<ValidationResult, ValidateError> {
    let detail = ctx.tracker.view_issue(issue)?;
    let pr_number = ctx.tracker.search_prs(&format!("closes:#{issue}"))?.first().copied();
    let pr = pr_number.map(|n| ctx.tracker.view_pr(n)).transpose()?;
    tracing::info!(issue, ?pr_number, "validating issue");

    let request = CompletionRequest {
        model: config.validator.model.clone(),
        system: Some(config.validator_instruction().to_string()),
        prompt: build_context(&detail, pr.as_ref(), config.diff_limit),
        max_tokens: config.validator.max_tokens,
        temperature: 0.0,
    };
    let response = ctx.llm.complete(&request).await.map_err(|e| LlmError(e.to_string()))?;

    let mut status = classify_verdict(&response.text);
    if pr.is_none() && status != ValidationStatus::NeedsReview {
        tracing::info!(issue, ?status, "no closing PR, downgrading verdict");
        status = ValidationStatus::NeedsReview;
    }

    Ok(ValidationResult {
        issue_number: issue,
        pr_number,
        status,
        summary: truncate_chars(&response.text, config.summary_limit),
        test_results: pr.as_ref().map(test_results).unwrap_or_default(),
        recommendations: extract_recommendations(&response.text),
    })
}

/// The document the validator model reviews.
#[must_use]
pub fn build_context(issue: &IssueDetail, pr: Option<&PullRequestDetail>, diff_limit: usize) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "ORIGINAL ISSUE:");
    let _ = writeln!(doc, "Title: {}", issue.title);
    let _ = writeln!(doc, "Body: {}", issue.body);
    let _ = writeln!(doc, "Labels: {}", issue.labels.join(", "));
    let _ = writeln!(doc, "\nIMPLEMENTATION:");

    match pr {
        Some(pr) => {
            let checks: Vec<String> =
                pr.checks.iter().map(|c| format!("{}:{}", c.name, c.conclusion)).collect();
            let _ = writeln!(doc, "PR Title: {}", pr.title);
            let _ = writeln!(doc, "PR Body: {}", pr.body);
            let _ = writeln!(doc, "Files Changed: {} files", pr.files.len());
            let _ = writeln!(doc, "Commits: {} commits", pr.commits.len());
            let _ = writeln!(doc, "Reviews: {} reviews", pr.reviews.len());
            let _ = writeln!(doc, "Checks: {}", checks.join(", "));
            let _ = writeln!(doc, "\nDIFF SUMMARY:");
            let _ = writeln!(doc, "{}", truncate_chars(&pr.diff, diff_limit));
        }
        None => {
            let _ = writeln!(doc, "{NO_PR_NOTICE}");
        }
    }
    doc
}

fn test_results(pr: &PullRequestDetail) -> Map<String, Value> {
    let checks: Map<String, Value> =
        pr.checks.iter().map(|c| (c.name.clone(), Value::from(c.conclusion.clone()))).collect();
    let value = json!({
        "files_changed": pr.files.len(),
        "commits": pr.commits.len(),
        "reviews": pr.reviews.len(),
        "checks": checks,
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Markdown comment mirroring `result` on the issue.
#[must_use]
pub fn format_comment(result: &ValidationResult) -> String {
    let mut out = String::from("## Validation Summary\n\n");
    let _ = writeln!(out, "**Status**: {}", result.status.label());
    match result.pr_number {
        Some(pr) => {
            let _ = writeln!(out, "**PR**: #{pr}");
        }
        None => out.push_str("**PR**: none found\n"),
    }
    let _ = write!(out, "\n{}\n", result.summary);
    if !result.recommendations.is_empty() {
        out.push_str("\n### Recommendations\n\n");
        for item in &result.recommendations {
            let _ = writeln!(out, "- {item}");
        }
    }
    out.push_str("\n---\n*Automated validation by stagger*\n");
    out
}

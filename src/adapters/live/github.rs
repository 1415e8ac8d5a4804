//! Live `IssueTracker` backed by the GitHub CLI (`gh`).

use std::process::Command;

use serde::Deserialize;

use crate::error::TrackerError;
use crate::ports::tracker::{
    CheckRun, IssueComment, IssueDetail, IssueTracker, NewIssue, PullRequestDetail,
};

const ISSUE_FIELDS: &str = "number,title,body,labels,state,assignees,comments";
const PR_FIELDS: &str = "number,title,body,files,commits,reviews,statusCheckRollup";

/// Shells out to `gh` for every tracker operation.
///
/// Authentication and the default repository come from `gh` itself
/// (`gh auth login`, `GH_REPO`); [`with_repo`](Self::with_repo) pins one.
#[derive(Debug, Clone)]
pub struct GhIssueTracker {
    program: String,
    repo: Option<String>,
}

impl Default for GhIssueTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GhIssueTracker {
    /// Uses `gh` from `PATH` against its default repository.
    #[must_use]
    pub fn new() -> Self {
        Self { program: "gh".into(), repo: None }
    }

    /// Targets `owner/name` explicitly.
    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Uses a different executable, e.g. a wrapper script.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn gh(&self, operation: &str, args: &[&str]) -> Result<String, TrackerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(repo) = &self.repo {
            cmd.args(["--repo", repo]);
        }
        tracing::debug!(operation, ?args, "invoking gh");

        let output = cmd
            .output()
            .map_err(|e| TrackerError::new(operation, format!("cannot run {}: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackerError::new(operation, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `gh issue create` prints the new issue URL; its last segment is the number.
fn parse_issue_number(stdout: &str) -> Result<u64, TrackerError> {
    stdout
        .trim()
        .rsplit('/')
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| TrackerError::new("create_issue", format!("unexpected output: {stdout}")))
}

#[derive(Deserialize)]
struct GhName {
    name: String,
}

#[derive(Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Deserialize)]
struct GhComment {
    #[serde(default)]
    author: Option<GhUser>,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    labels: Vec<GhName>,
    state: String,
    #[serde(default)]
    assignees: Vec<GhUser>,
    #[serde(default)]
    comments: Vec<GhComment>,
}

#[derive(Deserialize)]
struct GhFile {
    path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhCommit {
    #[serde(default)]
    message_headline: String,
}

#[derive(Deserialize)]
struct GhReview {
    #[serde(default)]
    state: String,
}

/// `statusCheckRollup` mixes check runs (`name`/`conclusion`) and commit
/// statuses (`context`/`state`).
#[derive(Deserialize)]
struct GhCheck {
    name: Option<String>,
    context: Option<String>,
    conclusion: Option<String>,
    state: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPull {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    files: Vec<GhFile>,
    #[serde(default)]
    commits: Vec<GhCommit>,
    #[serde(default)]
    reviews: Vec<GhReview>,
    #[serde(default)]
    status_check_rollup: Vec<GhCheck>,
}

#[derive(Deserialize)]
struct GhNumber {
    number: u64,
}

fn decode<T: serde::de::DeserializeOwned>(operation: &str, json: &str) -> Result<T, TrackerError> {
    serde_json::from_str(json)
        .map_err(|e| TrackerError::new(operation, format!("cannot decode gh output: {e}")))
}

fn decode_issue(json: &str) -> Result<IssueDetail, TrackerError> {
    let issue: GhIssue = decode("view_issue", json)?;
    Ok(IssueDetail {
        number: issue.number,
        title: issue.title,
        body: issue.body,
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        state: issue.state,
        assignees: issue.assignees.into_iter().map(|u| u.login).collect(),
        comments: issue
            .comments
            .into_iter()
            .map(|c| IssueComment {
                author: c.author.map(|a| a.login).unwrap_or_default(),
                body: c.body,
            })
            .collect(),
    })
}

fn decode_pr(json: &str, diff: String) -> Result<PullRequestDetail, TrackerError> {
    let pr: GhPull = decode("view_pr", json)?;
    Ok(PullRequestDetail {
        number: pr.number,
        title: pr.title,
        body: pr.body,
        files: pr.files.into_iter().map(|f| f.path).collect(),
        commits: pr.commits.into_iter().map(|c| c.message_headline).collect(),
        reviews: pr.reviews.into_iter().map(|r| r.state).collect(),
        checks: pr
            .status_check_rollup
            .into_iter()
            .map(|c| CheckRun {
                name: c.name.or(c.context).unwrap_or_default(),
                conclusion: c.conclusion.or(c.state).unwrap_or_default(),
            })
            .collect(),
        diff,
    })
}

impl IssueTracker for GhIssueTracker {
    fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError> {
        let labels = issue.labels.join(",");
        let assignees = issue.assignees.join(",");
        let mut args =
            vec!["issue", "create", "--title", issue.title.as_str(), "--body", issue.body.as_str()];
        if !labels.is_empty() {
            args.extend(["--label", labels.as_str()]);
        }
        if !assignees.is_empty() {
            args.extend(["--assignee", assignees.as_str()]);
        }
        let stdout = self.gh("create_issue", &args)?;
        parse_issue_number(&stdout)
    }

    fn add_label(&self, issue: u64, label: &str) -> Result<(), TrackerError> {
        let number = issue.to_string();
        self.gh("add_label", &["issue", "edit", &number, "--add-label", label]).map(|_| ())
    }

    fn view_issue(&self, issue: u64) -> Result<IssueDetail, TrackerError> {
        let number = issue.to_string();
        let json = self.gh("view_issue", &["issue", "view", &number, "--json", ISSUE_FIELDS])?;
        decode_issue(&json)
    }

    fn view_pr(&self, pr: u64) -> Result<PullRequestDetail, TrackerError> {
        let number = pr.to_string();
        let json = self.gh("view_pr", &["pr", "view", &number, "--json", PR_FIELDS])?;
        let diff = self.gh("view_pr", &["pr", "diff", &number])?;
        decode_pr(&json, diff)
    }

    fn search_prs(&self, query: &str) -> Result<Vec<u64>, TrackerError> {
        let json = self.gh(
            "search_prs",
            &["pr", "list", "--search", query, "--state", "all", "--json", "number"],
        )?;
        let hits: Vec<GhNumber> = decode("search_prs", &json)?;
        Ok(hits.into_iter().map(|h| h.number).collect())
    }

    fn comment_issue(&self, issue: u64, body: &str) -> Result<(), TrackerError> {
        let number = issue.to_string();
        self.gh("comment_issue", &["issue", "comment", &number, "--body", body]).map(|_| ())
    }
}

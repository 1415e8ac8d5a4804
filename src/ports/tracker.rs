//! Issue tracker port: issues, labels, pull requests, comments.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Fields for a new tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,
    /// Issue body (Markdown).
    pub body: String,
    /// Labels to attach at creation time.
    pub labels: Vec<String>,
    /// Logins to assign.
    pub assignees: Vec<String>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment author login.
    pub author: String,
    /// Comment text.
    pub body: String,
}

/// An issue as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetail {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Label names.
    pub labels: Vec<String>,
    /// Tracker state, e.g. `OPEN` or `CLOSED`.
    pub state: String,
    /// Assignee logins.
    pub assignees: Vec<String>,
    /// Discussion comments.
    #[serde(default)]
    pub comments: Vec<IssueComment>,
}

impl IssueDetail {
    /// Returns `true` when the tracker reports the issue as closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("closed")
    }
}

/// One CI check on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name.
    pub name: String,
    /// Conclusion such as `SUCCESS` or `FAILURE`; empty while pending.
    pub conclusion: String,
}

/// A pull request with its diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    /// Pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Description.
    pub body: String,
    /// Paths of changed files.
    pub files: Vec<String>,
    /// Commit headlines.
    pub commits: Vec<String>,
    /// Review states (e.g. `APPROVED`).
    pub reviews: Vec<String>,
    /// CI checks.
    pub checks: Vec<CheckRun>,
    /// Unified diff.
    pub diff: String,
}

/// Operations consumed from the issue tracker.
///
/// Every call is blocking. Failures surface as [`TrackerError`] so the
/// rollout can recover per step.
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns its number.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker rejects or cannot be reached.
    fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError>;

    /// Adds a label to an existing issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be applied.
    fn add_label(&self, issue: u64, label: &str) -> Result<(), TrackerError>;

    /// Fetches an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be fetched or decoded.
    fn view_issue(&self, issue: u64) -> Result<IssueDetail, TrackerError>;

    /// Fetches a pull request including its diff.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull request cannot be fetched or decoded.
    fn view_pr(&self, pr: u64) -> Result<PullRequestDetail, TrackerError>;

    /// Searches pull requests in any state; returns matching numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn search_prs(&self, query: &str) -> Result<Vec<u64>, TrackerError>;

    /// Posts a comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment cannot be posted.
    fn comment_issue(&self, issue: u64, body: &str) -> Result<(), TrackerError>;
}

//! Recording adapter for the `IssueTracker` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::error::TrackerError;
use crate::ports::tracker::{IssueDetail, IssueTracker, NewIssue, PullRequestDetail};

/// Records every tracker call, including failures.
pub struct RecordingIssueTracker {
    inner: Box<dyn IssueTracker>,
    recorder: SharedRecorder,
}

impl RecordingIssueTracker {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn IssueTracker>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }

    fn record<I: Serialize, T: Serialize>(
        &self,
        method: &str,
        input: &I,
        result: &Result<T, TrackerError>,
    ) {
        record_result(&self.recorder, "tracker", method, input, result);
    }
}

#[derive(Serialize)]
struct IssueInput<'a> {
    issue: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct QueryInput<'a> {
    query: &'a str,
}

impl IssueTracker for RecordingIssueTracker {
    fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError> {
        let result = self.inner.create_issue(issue);
        self.record("create_issue", issue, &result);
        result
    }

    fn add_label(&self, issue: u64, label: &str) -> Result<(), TrackerError> {
        let result = self.inner.add_label(issue, label);
        self.record("add_label", &IssueInput { issue, label: Some(label), body: None }, &result);
        result
    }

    fn view_issue(&self, issue: u64) -> Result<IssueDetail, TrackerError> {
        let result = self.inner.view_issue(issue);
        self.record("view_issue", &IssueInput { issue, label: None, body: None }, &result);
        result
    }

    fn view_pr(&self, pr: u64) -> Result<PullRequestDetail, TrackerError> {
        let result = self.inner.view_pr(pr);
        self.record("view_pr", &IssueInput { issue: pr, label: None, body: None }, &result);
        result
    }

    fn search_prs(&self, query: &str) -> Result<Vec<u64>, TrackerError> {
        let result = self.inner.search_prs(query);
        self.record("search_prs", &QueryInput { query }, &result);
        result
    }

    fn comment_issue(&self, issue: u64, body: &str) -> Result<(), TrackerError> {
        let result = self.inner.comment_issue(issue, body);
        self.record("comment_issue", &IssueInput { issue, label: None, body: Some(body) }, &result);
        result
    }
}

//! Replaying adapter for the `IssueTracker` port.

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use super::next_output;
use crate::cassette::format::decode_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::TrackerError;
use crate::ports::tracker::{IssueDetail, IssueTracker, NewIssue, PullRequestDetail};

/// Serves recorded tracker responses, including recorded failures.
pub struct ReplayingIssueTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIssueTracker {
    /// Replays from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: DeserializeOwned>(&self, method: &str) -> Result<T, TrackerError> {
        let output = next_output(&self.replayer, "tracker", method);
        decode_result(&output, &format!("tracker::{method}"))
            .map_err(|message| TrackerError::new(method, message))
    }
}

impl IssueTracker for ReplayingIssueTracker {
    fn create_issue(&self, _issue: &NewIssue) -> Result<u64, TrackerError> {
        self.replay("create_issue")
    }

    fn add_label(&self, _issue: u64, _label: &str) -> Result<(), TrackerError> {
        self.replay("add_label")
    }

    fn view_issue(&self, _issue: u64) -> Result<IssueDetail, TrackerError> {
        self.replay("view_issue")
    }

    fn view_pr(&self, _pr: u64) -> Result<PullRequestDetail, TrackerError> {
        self.replay("view_pr")
    }

    fn search_prs(&self, _query: &str) -> Result<Vec<u64>, TrackerError> {
        self.replay("search_prs")
    }

    fn comment_issue(&self, _issue: u64, _body: &str) -> Result<(), TrackerError> {
        self.replay("comment_issue")
    }
}

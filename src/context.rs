//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};

use crate::adapters::live::{
    GhIssueTracker, LiveClock, LiveFileSystem, LiveIdGenerator, LiveLlmClient,
};
use crate::adapters::recording::{
    RecordingClock, RecordingFileSystem, RecordingIdGenerator, RecordingIssueTracker,
    RecordingLlmClient,
};
use crate::adapters::replaying::{
    ReplayingClock, ReplayingFileSystem, ReplayingIdGenerator, ReplayingIssueTracker,
    ReplayingLlmClient,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::error::TrackerError;
use crate::ports::filesystem::FsError;
use crate::ports::llm::{CompletionRequest, LlmFuture};
use crate::ports::tracker::{IssueDetail, NewIssue, PullRequestDetail};
use crate::ports::{Clock, FileSystem, IdGenerator, IssueTracker, LlmClient};

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up live, recording, or replaying adapters; the domain
/// code never knows which.
pub struct ServiceContext {
    /// Clock for rollout timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for specs, config and artifacts.
    pub fs: Box<dyn FileSystem>,
    /// Run identifiers.
    pub id_gen: Box<dyn IdGenerator>,
    /// Planner and validator model.
    pub llm: Box<dyn LlmClient>,
    /// Issue tracker.
    pub tracker: Box<dyn IssueTracker>,
}

impl ServiceContext {
    /// Live adapters for every port.
    #[must_use]
    pub fn live() -> Self {
        let tracker = match std::env::var("STAGGER_REPO") {
            Ok(repo) if !repo.is_empty() => GhIssueTracker::new().with_repo(repo),
            _ => GhIssueTracker::new(),
        };
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            llm: Box::new(LiveLlmClient::new()),
            tracker: Box::new(tracker),
        }
    }

    /// Live adapters wrapped in recorders writing per-port cassettes to `dir`.
    ///
    /// The session must be finished after the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording session cannot be started.
    pub fn recording_at(dir: PathBuf) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::at(&dir)?;
        let live = Self::live();
        let ctx = Self {
            clock: Box::new(RecordingClock::new(live.clock, session.clock.clone())),
            fs: Box::new(RecordingFileSystem::new(live.fs, session.fs.clone())),
            id_gen: Box::new(RecordingIdGenerator::new(live.id_gen, session.id_gen.clone())),
            llm: Box::new(RecordingLlmClient::new(live.llm, session.llm.clone())),
            tracker: Box::new(RecordingIssueTracker::new(live.tracker, session.tracker.clone())),
        };
        Ok((ctx, session))
    }

    /// Replays every port; ports without a cassette panic when called.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured cassette cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let unconfigured = Self {
            clock: Box::new(Unconfigured),
            fs: Box::new(Unconfigured),
            id_gen: Box::new(Unconfigured),
            llm: Box::new(Unconfigured),
            tracker: Box::new(Unconfigured),
        };
        unconfigured.with_replayed(config)
    }

    /// Replaces each port that has a cassette with its replaying adapter and
    /// keeps the current adapter for the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured cassette cannot be read or parsed.
    pub fn with_replayed(mut self, config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        if let Some(r) = replayers.clock {
            self.clock = Box::new(ReplayingClock::new(r));
        }
        if let Some(r) = replayers.fs {
            self.fs = Box::new(ReplayingFileSystem::new(r));
        }
        if let Some(r) = replayers.id_gen {
            self.id_gen = Box::new(ReplayingIdGenerator::new(r));
        }
        if let Some(r) = replayers.llm {
            self.llm = Box::new(ReplayingLlmClient::new(r));
        }
        if let Some(r) = replayers.tracker {
            self.tracker = Box::new(ReplayingIssueTracker::new(r));
        }
        Ok(self)
    }
}

// --- Panicking adapter for ports without a cassette ---

struct Unconfigured;

fn unconfigured(port: &str) -> ! {
    panic!("{port} port not configured in CassetteConfig: no cassette loaded for {port}");
}

impl Clock for Unconfigured {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        unconfigured("clock")
    }
}

impl FileSystem for Unconfigured {
    fn read_to_string(&self, _path: &Path) -> Result<String, FsError> {
        unconfigured("fs")
    }
    fn write(&self, _path: &Path, _contents: &str) -> Result<(), FsError> {
        unconfigured("fs")
    }
    fn exists(&self, _path: &Path) -> bool {
        unconfigured("fs")
    }
}

impl IdGenerator for Unconfigured {
    fn generate_id(&self) -> String {
        unconfigured("id_gen")
    }
}

impl LlmClient for Unconfigured {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        unconfigured("llm")
    }
}

impl IssueTracker for Unconfigured {
    fn create_issue(&self, _issue: &NewIssue) -> Result<u64, TrackerError> {
        unconfigured("tracker")
    }
    fn add_label(&self, _issue: u64, _label: &str) -> Result<(), TrackerError> {
        unconfigured("tracker")
    }
    fn view_issue(&self, _issue: u64) -> Result<IssueDetail, TrackerError> {
        unconfigured("tracker")
    }
    fn view_pr(&self, _pr: u64) -> Result<PullRequestDetail, TrackerError> {
        unconfigured("tracker")
    }
    fn search_prs(&self, _query: &str) -> Result<Vec<u64>, TrackerError> {
        unconfigured("tracker")
    }
    fn comment_issue(&self, _issue: u64, _body: &str) -> Result<(), TrackerError> {
        unconfigured("tracker")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use serde_json::json;

    #[test]
    fn replaying_from_per_port_cassettes() {
        let dir = std::env::temp_dir().join("stagger_ctx_test_ports");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut clock = CassetteRecorder::new(dir.join("clock.cassette.yaml"), "clock", "c");
        clock.record("clock", "now", json!({}), json!("2025-01-01T00:00:00Z"));
        clock.finish().unwrap();
        let mut ids = CassetteRecorder::new(dir.join("id_gen.cassette.yaml"), "id_gen", "c");
        ids.record("id_gen", "generate_id", json!({}), json!("run-7"));
        ids.finish().unwrap();

        let ctx = ServiceContext::replaying_from(&CassetteConfig::from_dir(&dir)).unwrap();
        assert_eq!(ctx.clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(ctx.id_gen.generate_id(), "run-7");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn with_replayed_keeps_ports_without_cassettes() {
        let dir = std::env::temp_dir().join("stagger_ctx_test_partial");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut ids = CassetteRecorder::new(dir.join("id_gen.cassette.yaml"), "id_gen", "c");
        ids.record("id_gen", "generate_id", json!({}), json!("recorded"));
        ids.finish().unwrap();

        let ctx = ServiceContext::live().with_replayed(&CassetteConfig::from_dir(&dir)).unwrap();
        assert_eq!(ctx.id_gen.generate_id(), "recorded");
        assert!(!ctx.fs.exists(&dir.join("nothing-here")), "fs stays live");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn unspecified_port_panics_with_clear_message() {
        let ctx = ServiceContext::replaying_from(&CassetteConfig::default()).unwrap();
        let _ = ctx.clock.now();
    }
}

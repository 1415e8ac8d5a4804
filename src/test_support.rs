//! In-memory port doubles shared by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::context::ServiceContext;
use crate::error::TrackerError;
use crate::ports::filesystem::FsError;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmFuture};
use crate::ports::tracker::{IssueDetail, NewIssue, PullRequestDetail};
use crate::ports::{Clock, FileSystem, IdGenerator, IssueTracker, LlmClient};

/// Filesystem backed by a shared map; clones see the same files.
#[derive(Clone, Default)]
pub(crate) struct MemFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MemFs {
    pub(crate) fn get(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        self.get(path).ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }
}

#[derive(Default)]
struct TrackerState {
    created: Vec<NewIssue>,
    labeled: Vec<(u64, String)>,
    comments: Vec<(u64, String)>,
    issues: HashMap<u64, IssueDetail>,
    prs: HashMap<u64, PullRequestDetail>,
    searches: HashMap<String, Vec<u64>>,
    fail_titles: HashSet<String>,
    fail_labels: bool,
}

/// Tracker that numbers issues from 1 and can be told to fail.
#[derive(Clone, Default)]
pub(crate) struct FakeTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl FakeTracker {
    pub(crate) fn fail_create(&self, title: &str) {
        self.state.lock().unwrap().fail_titles.insert(title.to_string());
    }

    pub(crate) fn fail_labels(&self) {
        self.state.lock().unwrap().fail_labels = true;
    }

    pub(crate) fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_titles.clear();
        state.fail_labels = false;
    }

    pub(crate) fn close(&self, issue: u64) {
        if let Some(detail) = self.state.lock().unwrap().issues.get_mut(&issue) {
            detail.state = "CLOSED".into();
        }
    }

    pub(crate) fn add_issue(&self, detail: IssueDetail) {
        self.state.lock().unwrap().issues.insert(detail.number, detail);
    }

    pub(crate) fn add_pr(&self, query: &str, pr: PullRequestDetail) {
        let mut state = self.state.lock().unwrap();
        state.searches.entry(query.to_string()).or_default().push(pr.number);
        state.prs.insert(pr.number, pr);
    }

    pub(crate) fn created(&self) -> Vec<NewIssue> {
        self.state.lock().unwrap().created.clone()
    }

    pub(crate) fn labeled(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().labeled.clone()
    }

    pub(crate) fn comments(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().comments.clone()
    }
}

impl IssueTracker for FakeTracker {
    fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_titles.contains(&issue.title) {
            return Err(TrackerError::new("create_issue", format!("rejected {}", issue.title)));
        }
        state.created.push(issue.clone());
        let number = state.created.len() as u64;
        state.issues.insert(
            number,
            IssueDetail {
                number,
                title: issue.title.clone(),
                body: issue.body.clone(),
                labels: issue.labels.clone(),
                state: "OPEN".into(),
                assignees: issue.assignees.clone(),
                comments: vec![],
            },
        );
        Ok(number)
    }

    fn add_label(&self, issue: u64, label: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_labels {
            return Err(TrackerError::new("add_label", "label service unavailable"));
        }
        state.labeled.push((issue, label.to_string()));
        if let Some(detail) = state.issues.get_mut(&issue) {
            detail.labels.push(label.to_string());
        }
        Ok(())
    }

    fn view_issue(&self, issue: u64) -> Result<IssueDetail, TrackerError> {
        self.state
            .lock()
            .unwrap()
            .issues
            .get(&issue)
            .cloned()
            .ok_or_else(|| TrackerError::new("view_issue", format!("issue #{issue} not found")))
    }

    fn view_pr(&self, pr: u64) -> Result<PullRequestDetail, TrackerError> {
        self.state
            .lock()
            .unwrap()
            .prs
            .get(&pr)
            .cloned()
            .ok_or_else(|| TrackerError::new("view_pr", format!("PR #{pr} not found")))
    }

    fn search_prs(&self, query: &str) -> Result<Vec<u64>, TrackerError> {
        Ok(self.state.lock().unwrap().searches.get(query).cloned().unwrap_or_default())
    }

    fn comment_issue(&self, issue: u64, body: &str) -> Result<(), TrackerError> {
        self.state.lock().unwrap().comments.push((issue, body.to_string()));
        Ok(())
    }
}

/// Model that answers from a script and keeps every request.
pub(crate) struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedLlm {
    pub(crate) fn new(responses: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmClient for ScriptedLlm {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front().expect("ScriptedLlm has no answer left");
        Box::pin(async move {
            next.map(|text| CompletionResponse { text, prompt_tokens: 10, completion_tokens: 5 })
                .map_err(Into::into)
        })
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        "2025-01-01T00:00:00Z".parse().unwrap()
    }
}

#[derive(Default)]
struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        format!("run-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Context with in-memory doubles for every port.
pub(crate) fn test_context() -> ServiceContext {
    ServiceContext {
        clock: Box::new(FixedClock),
        fs: Box::new(MemFs::default()),
        id_gen: Box::new(SequentialIds::default()),
        llm: Box::new(ScriptedLlm::new([])),
        tracker: Box::new(FakeTracker::default()),
    }
}

/// [`test_context`] with a scripted model.
pub(crate) fn context_with(llm: ScriptedLlm) -> ServiceContext {
    let mut ctx = test_context();
    ctx.llm = Box::new(llm);
    ctx
}

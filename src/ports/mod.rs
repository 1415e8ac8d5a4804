//! Port traits defining external boundaries.
//!
//! Each trait is a seam between the rollout core and something it does not
//! own: time, disk, identifiers, the language model, and the issue tracker.
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod llm;
pub mod tracker;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};
pub use tracker::{CheckRun, IssueComment, IssueDetail, IssueTracker, NewIssue, PullRequestDetail};

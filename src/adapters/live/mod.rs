//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod github;
pub mod id_gen;
pub mod llm;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use github::GhIssueTracker;
pub use id_gen::LiveIdGenerator;
pub use llm::LiveLlmClient;

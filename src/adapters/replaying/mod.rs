//! Replaying adapters: serve recorded interactions instead of calling out.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod llm;
pub mod tracker;

pub use clock::ReplayingClock;
pub use filesystem::ReplayingFileSystem;
pub use id_gen::ReplayingIdGenerator;
pub use llm::ReplayingLlmClient;
pub use tracker::ReplayingIssueTracker;

use std::sync::Mutex;

use serde_json::Value;

use crate::cassette::replayer::CassetteReplayer;

/// Takes the output of the next interaction recorded for `port`/`method`.
///
/// # Panics
///
/// Panics if the lock is poisoned or the cassette has nothing left for the
/// pair (see [`CassetteReplayer::next_interaction`]).
pub(crate) fn next_output(replayer: &Mutex<CassetteReplayer>, port: &str, method: &str) -> Value {
    replayer.lock().expect("replayer lock poisoned").next_interaction(port, method).output
}

//! Recording adapters: delegate to an inner port and log each call.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod llm;
pub mod tracker;

pub use clock::RecordingClock;
pub use filesystem::RecordingFileSystem;
pub use id_gen::RecordingIdGenerator;
pub use llm::RecordingLlmClient;
pub use tracker::RecordingIssueTracker;

use serde::Serialize;

use crate::cassette::format::encode_result;
use crate::cassette::session::SharedRecorder;

/// Records an infallible call.
///
/// # Panics
///
/// Panics if `input` or `output` cannot be represented as JSON or the
/// recorder lock is poisoned; both mean the recording itself is unusable.
pub(crate) fn record_value<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input = serde_json::to_value(input).expect("recording input must serialize");
    let output = serde_json::to_value(output).expect("recording output must serialize");
    recorder.lock().expect("recorder lock poisoned").record(port, method, input, output);
}

/// Records a fallible call using the `{"ok": ..}` / `{"err": ..}` convention.
///
/// # Panics
///
/// Same conditions as [`record_value`].
pub(crate) fn record_result<I, T, E>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    I: Serialize,
    T: Serialize,
    E: std::fmt::Display,
{
    let input = serde_json::to_value(input).expect("recording input must serialize");
    recorder.lock().expect("recorder lock poisoned").record(
        port,
        method,
        input,
        encode_result(result),
    );
}

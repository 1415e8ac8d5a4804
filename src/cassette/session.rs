//! A recording session: one shared recorder per port.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use super::recorder::CassetteRecorder;

/// Shared handle to a port's recorder, cloned into each recording adapter.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Per-port recorders writing `<port>.cassette.yaml` into one directory.
pub struct RecordingSession {
    /// LLM recorder.
    pub llm: SharedRecorder,
    /// Tracker recorder.
    pub tracker: SharedRecorder,
    /// Filesystem recorder.
    pub fs: SharedRecorder,
    /// Clock recorder.
    pub clock: SharedRecorder,
    /// ID generator recorder.
    pub id_gen: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Starts a session writing into `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or already holds
    /// cassettes (a session never overwrites an earlier recording).
    pub fn at(output_dir: &Path) -> Result<Self, String> {
        if output_dir.join("tracker.cassette.yaml").exists() {
            return Err(format!("Cassettes already recorded in {}", output_dir.display()));
        }
        std::fs::create_dir_all(output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = commit_hash();
        let make = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, port, &commit)))
        };

        Ok(Self {
            llm: make("llm"),
            tracker: make("tracker"),
            fs: make("fs"),
            clock: make("clock"),
            id_gen: make("id_gen"),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Writes every port's cassette and returns the output directory.
    ///
    /// All recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a write fails.
    pub fn finish(self) -> Result<PathBuf, String> {
        for (port, shared) in [
            ("llm", self.llm),
            ("tracker", self.tracker),
            ("fs", self.fs),
            ("clock", self.clock),
            ("id_gen", self.id_gen),
        ] {
            let recorder = Arc::try_unwrap(shared)
                .map_err(|_| format!("Recording adapter for {port} is still alive"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
        }
        Ok(self.output_dir)
    }
}

/// HEAD commit of the current directory's repository, or `unknown`.
fn commit_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(
            || {
                tracing::warn!("could not read git commit for cassette metadata");
                "unknown".to_string()
            },
            |s| s.trim().to_string(),
        )
}

//! Artifact store: plan, rollout record and validation results as JSON.
//!
//! Layout under the configured artifact directory:
//!
//! ```text
//! <root>/
//!   ├── plan.json
//!   ├── rollout.json
//!   └── validation_<issue>.json
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ServiceContext;
use crate::plan::Plan;
use crate::rollout::RolloutRecord;
use crate::validate::ValidationResult;

const PLAN_FILE: &str = "plan.json";
const ROLLOUT_FILE: &str = "rollout.json";

/// Reads and writes artifacts through `ctx.fs`, so it works with live,
/// recording and replaying adapters alike.
pub struct ArtifactStore<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
}

impl<'a> ArtifactStore<'a> {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `plan.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_plan(&self, plan: &Plan) -> Result<PathBuf, String> {
        self.save(PLAN_FILE, plan, "plan")
    }

    /// Reads `plan.json`.
    ///
    /// The plan is only structurally parsed; order it with the sequencer
    /// before use.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_plan(&self) -> Result<Plan, String> {
        self.load(PLAN_FILE, "plan")
    }

    /// Writes `rollout.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_record(&self, record: &RolloutRecord) -> Result<PathBuf, String> {
        self.save(ROLLOUT_FILE, record, "rollout record")
    }

    /// Reads `rollout.json`, or `None` when no rollout has run here.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_record(&self) -> Result<Option<RolloutRecord>, String> {
        if !self.ctx.fs.exists(&self.root.join(ROLLOUT_FILE)) {
            return Ok(None);
        }
        self.load(ROLLOUT_FILE, "rollout record").map(Some)
    }

    /// Writes `validation_<issue>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_validation(&self, result: &ValidationResult) -> Result<PathBuf, String> {
        self.save(&validation_file(result.issue_number), result, "validation result")
    }

    /// Reads `validation_<issue>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_validation(&self, issue: u64) -> Result<ValidationResult, String> {
        self.load(&validation_file(issue), "validation result")
    }

    fn save<T: Serialize>(&self, file: &str, value: &T, what: &str) -> Result<PathBuf, String> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| format!("Failed to serialize {what}: {e}"))?;
        let path = self.root.join(file);
        self.ctx
            .fs
            .write(&path, &format!("{json}\n"))
            .map_err(|e| format!("Failed to write {what} to {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "saved {what}");
        Ok(path)
    }

    fn load<T: DeserializeOwned>(&self, file: &str, what: &str) -> Result<T, String> {
        let path = self.root.join(file);
        let text = self
            .ctx
            .fs
            .read_to_string(&path)
            .map_err(|e| format!("Failed to read {what} from {}: {e}", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse {what} in {}: {e}", path.display()))
    }
}

fn validation_file(issue: u64) -> String {
    format!("validation_{issue}.json")
}

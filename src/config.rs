//! Run configuration: vocabulary, trigger label, prompts, limits.
//!
//! Every field has a default, so a missing `stagger.yaml` is not an error.
//! Environment overrides are applied after the file is read.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ports::FileSystem;

/// Config file read from the working directory when `STAGGER_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "stagger.yaml";

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const PLANNER_INSTRUCTION: &str = "\
You are the Planner. Break the following SPEC into atomic tracker issues. Each issue must include:
- a clear title
- an actionable body with acceptance criteria and the tests that prove it
- labels from this set only: {labels}
- mark ai_ready=true only if the task is safe for an automated coding agent \
(no secret rotation, no production data operations)
- dependencies: the 1-based positions of earlier issues that must be completed first

Order the issues so that tests come first, then the implementation, then refinement.
Output strictly a JSON array of objects with the fields: \
title, body, labels, assignees, ai_ready, dependencies.
";

const VALIDATOR_INSTRUCTION: &str = "\
You are the Validator. Review the completed work against the original issue requirements.
Begin your answer with a single line `Status: pass`, `Status: fail` or `Status: needs_review`.
Then provide:
1. A summary of what was implemented
2. Test coverage analysis
3. Code quality observations
Finish with a `Recommendations` heading followed by one bullet per recommendation.
Focus on separation of concerns, test coverage, and security considerations.
";

/// Model settings for one collaborator call.
///
/// An absent `instruction` falls back to the built-in prompt for the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent to the LLM port.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// System instruction override.
    pub instruction: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.into(), max_tokens: 4096, instruction: None }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label that hands an issue to the automated agent.
    pub trigger_label: String,
    /// Labels a task may carry.
    pub labels: BTreeSet<String>,
    /// Issue title template; `{step}` and `{title}` are substituted.
    pub title_format: String,
    /// Directory for plan, rollout and validation artifacts.
    pub artifact_dir: PathBuf,
    /// Planner collaborator settings.
    pub planner: ModelConfig,
    /// Validator collaborator settings.
    pub validator: ModelConfig,
    /// Characters of PR diff included in the validation context.
    pub diff_limit: usize,
    /// Characters of model response kept as the validation summary.
    pub summary_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_label: "fix-me".into(),
            labels: ["api", "ui", "infra", "docs", "test", "accessibility", "p1", "p2", "p3"]
                .into_iter()
                .map(String::from)
                .collect(),
            title_format: "{title}".into(),
            artifact_dir: PathBuf::from(".stagger"),
            planner: ModelConfig::default(),
            validator: ModelConfig::default(),
            diff_limit: 5000,
            summary_limit: 500,
        }
    }
}

impl Config {
    /// Reads `path` through the filesystem port, or returns defaults when it
    /// does not exist. Environment overrides are applied either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, String> {
        let mut config = if fs.exists(path) {
            let text = fs
                .read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
            Self::from_yaml(&text)
                .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses YAML; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Applies `STAGGER_TRIGGER_LABEL`, `PLANNER_MODEL`, `VALIDATOR_MODEL`
    /// and `STAGGER_ARTIFACT_DIR` as returned by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(label) = non_empty("STAGGER_TRIGGER_LABEL") {
            self.trigger_label = label;
        }
        if let Some(model) = non_empty("PLANNER_MODEL") {
            self.planner.model = model;
        }
        if let Some(model) = non_empty("VALIDATOR_MODEL") {
            self.validator.model = model;
        }
        if let Some(dir) = non_empty("STAGGER_ARTIFACT_DIR") {
            self.artifact_dir = PathBuf::from(dir);
        }
    }

    /// Renders an issue title for `step`.
    #[must_use]
    pub fn issue_title(&self, step: usize, title: &str) -> String {
        self.title_format.replace("{step}", &step.to_string()).replace("{title}", title)
    }

    /// Planner instruction with the label vocabulary filled in.
    #[must_use]
    pub fn planner_instruction(&self) -> String {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        self.planner
            .instruction
            .as_deref()
            .unwrap_or(PLANNER_INSTRUCTION)
            .replace("{labels}", &labels.join(", "))
    }

    /// Validator instruction.
    #[must_use]
    pub fn validator_instruction(&self) -> &str {
        self.validator.instruction.as_deref().unwrap_or(VALIDATOR_INSTRUCTION)
    }
}

/// Config path: `STAGGER_CONFIG` or [`DEFAULT_CONFIG_FILE`].
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var_os("STAGGER_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

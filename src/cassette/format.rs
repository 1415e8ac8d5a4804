//! On-disk cassette shape and the result-encoding convention.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One call made through a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position within the cassette, assigned by the recorder.
    pub seq: u64,
    /// Port name (`llm`, `tracker`, `fs`, `clock`, `id_gen`).
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Call arguments, for human inspection; replay ignores them.
    pub input: Value,
    /// What the port returned.
    pub output: Value,
}

/// A named, ordered list of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Cassette name.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Commit of the working tree at recording time.
    pub commit: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads a YAML cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a cassette.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette {}: {e}", path.display()))
    }

    /// Writes this cassette as YAML, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(path, yaml)
    }
}

/// Encodes a fallible port result as `{"ok": value}` or `{"err": message}`.
///
/// # Panics
///
/// Panics if the `Ok` value cannot be represented as JSON, which would mean a
/// port type with a non-serializable field.
pub fn encode_result<T, E>(result: &Result<T, E>) -> Value
where
    T: Serialize,
    E: std::fmt::Display,
{
    match result {
        Ok(v) => json!({ "ok": serde_json::to_value(v).expect("port output must serialize") }),
        Err(e) => json!({ "err": e.to_string() }),
    }
}

/// Decodes a value written by [`encode_result`].
///
/// A bare value without an `ok`/`err` wrapper is treated as `ok`, which keeps
/// hand-written cassettes short.
///
/// # Errors
///
/// Returns the recorded error message, or a decode failure naming `context`.
pub fn decode_result<T: DeserializeOwned>(output: &Value, context: &str) -> Result<T, String> {
    if let Some(err) = output.get("err") {
        return Err(err.as_str().unwrap_or("unknown error").to_string());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone()).map_err(|e| format!("{context}: cannot decode: {e}"))
}

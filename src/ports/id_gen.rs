//! Identifier port.

/// Issues opaque identifiers, used to tag each rollout run.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier; live implementations never repeat.
    fn generate_id(&self) -> String;
}

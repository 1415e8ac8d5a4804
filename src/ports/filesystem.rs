//! Filesystem port for specification input and artifact output.

use std::error::Error;
use std::path::Path;

/// Boxed error returned by filesystem operations.
pub type FsError = Box<dyn Error + Send + Sync>;

/// Reads specifications and configuration, writes plan, rollout and
/// validation artifacts.
pub trait FileSystem: Send + Sync {
    /// Reads a UTF-8 file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;

    /// Writes a file, creating parent directories and replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or the write fails.
    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Returns `true` if something exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

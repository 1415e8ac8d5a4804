//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use super::next_output;
use crate::cassette::format::decode_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::filesystem::{FileSystem, FsError};

/// Serves recorded reads and existence checks; writes touch nothing.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Replays from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(&self, _path: &Path) -> Result<String, FsError> {
        let output = next_output(&self.replayer, "fs", "read_to_string");
        decode_result(&output, "fs::read_to_string").map_err(FsError::from)
    }

    fn write(&self, _path: &Path, _contents: &str) -> Result<(), FsError> {
        let output = next_output(&self.replayer, "fs", "write");
        decode_result(&output, "fs::write").map_err(FsError::from)
    }

    fn exists(&self, _path: &Path) -> bool {
        let output = next_output(&self.replayer, "fs", "exists");
        output.as_bool().expect("fs::exists: recorded value is not a boolean")
    }
}

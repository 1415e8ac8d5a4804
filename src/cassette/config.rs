//! Which cassette file serves which port.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Port names, also the stem of each per-port cassette file.
pub const PORTS: [&str; 5] = ["llm", "tracker", "fs", "clock", "id_gen"];

/// Optional cassette path per port. Ports left `None` are not replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CassetteConfig {
    /// Cassette for the LLM port.
    pub llm: Option<PathBuf>,
    /// Cassette for the issue tracker port.
    pub tracker: Option<PathBuf>,
    /// Cassette for the filesystem port.
    pub fs: Option<PathBuf>,
    /// Cassette for the clock port.
    pub clock: Option<PathBuf>,
    /// Cassette for the ID generator port.
    pub id_gen: Option<PathBuf>,
}

/// Replayers built from a [`CassetteConfig`].
#[derive(Debug, Default)]
pub struct PortReplayers {
    /// LLM replayer.
    pub llm: Option<CassetteReplayer>,
    /// Tracker replayer.
    pub tracker: Option<CassetteReplayer>,
    /// Filesystem replayer.
    pub fs: Option<CassetteReplayer>,
    /// Clock replayer.
    pub clock: Option<CassetteReplayer>,
    /// ID generator replayer.
    pub id_gen: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Picks up `<port>.cassette.yaml` files that exist in `dir`.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let find = |port: &str| {
            let path = dir.join(format!("{port}.cassette.yaml"));
            path.is_file().then_some(path)
        };
        Self {
            llm: find("llm"),
            tracker: find("tracker"),
            fs: find("fs"),
            clock: find("clock"),
            id_gen: find("id_gen"),
        }
    }

    /// Returns `true` if no port has a cassette.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.llm.is_none()
            && self.tracker.is_none()
            && self.fs.is_none()
            && self.clock.is_none()
            && self.id_gen.is_none()
    }

    /// Loads every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: &Option<PathBuf>| -> Result<Option<CassetteReplayer>, String> {
            path.as_deref().map(|p| Cassette::load(p).map(|c| CassetteReplayer::new(&c))).transpose()
        };
        Ok(PortReplayers {
            llm: load(&self.llm)?,
            tracker: load(&self.tracker)?,
            fs: load(&self.fs)?,
            clock: load(&self.clock)?,
            id_gen: load(&self.id_gen)?,
        })
    }
}

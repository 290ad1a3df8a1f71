use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use netradar_common::network::whitelist::Whitelist;
use tracing::{debug, info, warn};

/// File-backed source of the accepted-address list.
///
/// Nothing is cached: every [`load`](WhitelistStore::load) re-reads the file so
/// edits show up on the next cycle.
#[derive(Debug, Clone)]
pub struct WhitelistStore {
    path: PathBuf,
}

impl WhitelistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Whitelist {
        load(&self.path)
    }
}

/// Reads a whitelist, degrading to an empty one when the file is missing or unreadable.
pub fn load(path: &Path) -> Whitelist {
    match fs::read_to_string(path) {
        Ok(text) => {
            let whitelist = Whitelist::parse(&text);
            debug!(path = %path.display(), entries = whitelist.len(), "Whitelist loaded");
            whitelist
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Whitelist file not found, treating every host as unknown");
            Whitelist::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Whitelist unreadable, treating every host as unknown");
            Whitelist::new()
        }
    }
}

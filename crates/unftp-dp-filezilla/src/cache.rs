//! Read-through cache of parsed configuration files, invalidated by modification time.
//!
//! Entries also expire after a fixed time. A rewrite that keeps the length and lands within the
//! file system's timestamp resolution leaves the stamp unchanged, and expiry bounds how long such a
//! stale parse is served.

use crate::document::Element;
use moka::sync::Cache;
use std::{
    fmt,
    fs::Metadata,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

// One provider normally reads a single file
const MAX_FILES: u64 = 8;

/// How long a parse is reused at most, even when the file's stamp did not change.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(5);

/// What we remember about a file to tell whether it changed since it was parsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl Stamp {
    /// Takes the stamp of a file from its metadata.
    pub fn of(meta: &Metadata) -> Stamp {
        Stamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    stamp: Stamp,
    document: Arc<Element>,
}

/// Parsed documents keyed by path. A hit requires the file's current stamp to equal the stamp it
/// had when it was parsed.
#[derive(Clone)]
pub struct DocumentCache {
    entries: Cache<PathBuf, Arc<Entry>>,
}

impl DocumentCache {
    /// An empty cache whose entries expire after [`DEFAULT_TIME_TO_LIVE`].
    pub fn new() -> Self {
        Self::with_time_to_live(DEFAULT_TIME_TO_LIVE)
    }

    /// An empty cache whose entries expire `ttl` after they were inserted.
    pub fn with_time_to_live(ttl: Duration) -> Self {
        DocumentCache {
            entries: Cache::builder().max_capacity(MAX_FILES).time_to_live(ttl).build(),
        }
    }

    /// Returns the cached document for `path` if it was parsed from a file with `stamp`.
    pub fn get(&self, path: &Path, stamp: Stamp) -> Option<Arc<Element>> {
        self.entries
            .get(path)
            .filter(|entry| entry.stamp == stamp)
            .map(|entry| entry.document.clone())
    }

    /// Remembers `document` as the parse of `path` at `stamp`.
    pub fn insert(&self, path: &Path, stamp: Stamp, document: Arc<Element>) {
        self.entries.insert(path.to_path_buf(), Arc::new(Entry { stamp, document }));
    }

    /// Forgets `path`. Used when the file can no longer be read.
    pub fn invalidate(&self, path: &Path) {
        self.entries.invalidate(path);
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCache").field("entries", &self.entries.entry_count()).finish()
    }
}

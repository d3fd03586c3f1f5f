//! Process-wide cache of loaded tables, keyed by file content.
//!
//! ```text
//! load(path) ──► read bytes ──► sha256 ──► same path + hash cached? ──► yes: reuse snapshot
//!                    │                                              └─► no:  decode + parse, store
//!                    └─► missing/unreadable: status only, nothing cached
//! ```
//!
//! The file is always re-read so that a content change is noticed; only
//! decoding and parsing are skipped on a hit. Entries are immutable
//! `Arc<LoadedTable>` snapshots, so a render cycle keeps a consistent table
//! even if another thread replaces the entry.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::loader::{LoadedTable, RecordLoader, content_hash, read_source};
use crate::types::SourceInfo;

static GLOBAL_CACHE: Lazy<TableCache> = Lazy::new(TableCache::new);

struct CacheEntry {
    content_hash: String,
    config: DashboardConfig,
    table: Arc<LoadedTable>,
}

/// Cache of [`LoadedTable`] snapshots keyed by path and content hash.
#[derive(Default)]
pub struct TableCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

static_assertions::assert_impl_all!(TableCache: Send, Sync);

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static TableCache {
        &GLOBAL_CACHE
    }

    /// Load `path` through `loader`, reusing the cached table when the file
    /// content and the loader configuration are unchanged since it was cached.
    pub fn load(&self, loader: &RecordLoader, path: impl AsRef<Path>) -> Arc<LoadedTable> {
        let path = path.as_ref();
        let bytes = match read_source(path) {
            Ok(bytes) => bytes,
            Err(status) => {
                // the file is gone or unreadable, a stale entry must not be served
                self.invalidate(path);
                return Arc::new(LoadedTable::empty(status, SourceInfo::for_path(path)));
            }
        };

        let hash = content_hash(&bytes);
        if let Some(entry) = self.entries.read().get(path)
            && entry.content_hash == hash
            && &entry.config == loader.config()
        {
            debug!("Cache hit for {}", path.display());
            return Arc::clone(&entry.table);
        }

        debug!("Cache miss for {}, parsing", path.display());
        let table = Arc::new(loader.load_bytes(path, &bytes));
        self.entries.write().insert(
            path.to_path_buf(),
            CacheEntry {
                content_hash: hash,
                config: loader.config().clone(),
                table: Arc::clone(&table),
            },
        );
        table
    }

    /// Drop the entry for `path`, forcing the next load to re-parse.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        self.entries.write().remove(path.as_ref()).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

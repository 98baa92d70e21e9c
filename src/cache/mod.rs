//! Local cache of fetched playlist data.
//!
//! Entries are addressed by an explicit [`CacheKey`] (kind + id) and stored through a
//! [`CacheStore`] backend. Entries never expire; they live until cleared.

pub mod fs;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use fs::FsCacheStore;
pub use memory::MemoryCacheStore;

/// Namespace of a cache entry. Kinds never share entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// Playlist summaries.
    #[value(alias = "playlist")]
    Listing,
    /// Plain playlist items.
    #[value(alias = "videos")]
    Items,
    /// Playlist items enriched with durations.
    #[value(name = "items_with_duration", alias = "videos_durations")]
    ItemsWithDuration,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [
        CacheKind::Listing,
        CacheKind::Items,
        CacheKind::ItemsWithDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Listing => "listing",
            CacheKind::Items => "items",
            CacheKind::ItemsWithDuration => "items_with_duration",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub kind: CacheKind,
    pub id: String,
}

impl CacheKey {
    pub fn new(kind: CacheKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw key-value storage behind the playlist cache.
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` when the key has no entry.
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replaces the entry for `key`. Must not leave a partially written entry behind.
    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError>;

    /// Returns whether an entry was removed.
    fn remove(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// All stored keys with their size in bytes, optionally restricted to one kind.
    fn entries(&self, kind: Option<CacheKind>) -> Result<Vec<(CacheKey, u64)>, CacheError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
    pub per_kind: BTreeMap<CacheKind, usize>,
}

impl CacheStats {
    pub fn count_for(&self, kind: CacheKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Typed JSON view over a [`CacheStore`].
#[derive(Clone)]
pub struct PlaylistCache {
    store: Arc<dyn CacheStore>,
}

impl PlaylistCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    /// Cached list for `(kind, id)`.
    ///
    /// An unreadable or corrupt entry is logged and reported as absent.
    pub fn get<T: DeserializeOwned>(&self, kind: CacheKind, id: &str) -> Option<Vec<T>> {
        let key = CacheKey::new(kind, id);
        let bytes = match self.store.read(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read {} cache for {}: {}", kind, id, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!("Ignoring corrupt {} cache entry for {}: {}", kind, id, e);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, kind: CacheKind, id: &str, items: &[T]) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(items)?;
        self.store.write(&CacheKey::new(kind, id), &bytes)?;
        tracing::debug!("Cached {} {} entries for {}", items.len(), kind, id);
        Ok(())
    }

    /// Removes every entry of `kind`, or every entry when `kind` is `None`.
    pub fn clear(&self, kind: Option<CacheKind>) -> Result<usize, CacheError> {
        let mut removed = 0;
        for (key, _) in self.store.entries(kind)? {
            if self.store.remove(&key)? {
                removed += 1;
            }
        }
        tracing::info!("Removed {} cache entries", removed);
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats::default();
        for kind in CacheKind::ALL {
            stats.per_kind.insert(kind, 0);
        }

        for (key, size) in self.store.entries(None)? {
            stats.count += 1;
            stats.total_bytes += size;
            *stats.per_kind.entry(key.kind).or_insert(0) += 1;
        }
        Ok(stats)
    }
}

/// Human readable size, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

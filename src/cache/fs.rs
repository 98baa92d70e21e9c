use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use super::{CacheError, CacheKey, CacheKind, CacheStore};

const ENTRY_SUFFIX: &str = ".json";

/// One JSON file per entry: `<root>/<kind>/<url-encoded id>.json`.
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn kind_dir(&self, kind: CacheKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.kind_dir(key.kind)
            .join(format!("{}{}", urlencoding::encode(&key.id), ENTRY_SUFFIX))
    }

    fn kind_entries(&self, kind: CacheKind) -> Result<Vec<(CacheKey, u64)>, CacheError> {
        let dir = self.kind_dir(kind);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            // `.json` on its own is the entry for the empty id, which `extension()` misses.
            let Some(stem) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(ENTRY_SUFFIX))
            else {
                continue;
            };
            let id = match urlencoding::decode(stem) {
                Ok(id) => id.into_owned(),
                Err(_) => {
                    tracing::warn!("Skipping cache file with undecodable name: {}", path.display());
                    continue;
                }
            };
            let size = dir_entry.metadata()?.len();
            entries.push((CacheKey::new(kind, id), size));
        }
        entries.sort();
        Ok(entries)
    }
}

impl CacheStore for FsCacheStore {
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError> {
        let dir = self.kind_dir(key.kind);
        fs::create_dir_all(&dir)?;

        // Temp file in the same directory so the rename stays atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn entries(&self, kind: Option<CacheKind>) -> Result<Vec<(CacheKey, u64)>, CacheError> {
        let kinds: Vec<CacheKind> = match kind {
            Some(kind) => vec![kind],
            None => CacheKind::ALL.to_vec(),
        };

        let mut entries = Vec::new();
        for kind in kinds {
            entries.extend(self.kind_entries(kind)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PlaylistCache;
    use crate::models::PlaylistItem;
    use crate::test_utils::numbered_items;
    use std::sync::Arc;

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new(CacheKind::Items, "PL123");

        assert_eq!(store.read(&key).unwrap(), None);

        store.write(&key, b"[1,2,3]").unwrap();
        assert_eq!(store.read(&key).unwrap(), Some(b"[1,2,3]".to_vec()));
        assert!(dir.path().join("items").join("PL123.json").exists());

        assert!(store.remove(&key).unwrap());
        assert!(!store.remove(&key).unwrap());
        assert_eq!(store.read(&key).unwrap(), None);
    }

    #[test]
    fn test_ids_with_path_characters_are_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new(CacheKind::Listing, "../weird/id");

        store.write(&key, b"[]").unwrap();

        let entries = store.entries(Some(CacheKind::Listing)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, key);
        assert_eq!(entries[0].1, 2);
    }

    #[test]
    fn test_empty_id_is_listed_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new(CacheKind::Items, "");

        store.write(&key, b"[]").unwrap();
        assert_eq!(store.read(&key).unwrap(), Some(b"[]".to_vec()));
        assert_eq!(store.entries(None).unwrap(), vec![(key.clone(), 2)]);

        assert!(store.remove(&key).unwrap());
        assert!(store.entries(None).unwrap().is_empty());
    }

    #[test]
    fn test_entries_on_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("does-not-exist"));
        assert!(store.entries(None).unwrap().is_empty());
    }

    #[test]
    fn test_playlist_cache_over_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlaylistCache::new(Arc::new(FsCacheStore::new(dir.path())));
        let items = numbered_items(0, 4);

        cache.put(CacheKind::Items, "PL1", &items).unwrap();
        cache.put(CacheKind::ItemsWithDuration, "PL1", &items).unwrap();

        let cached: Vec<PlaylistItem> = cache.get(CacheKind::Items, "PL1").unwrap();
        assert_eq!(cached, items);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.count_for(CacheKind::Items), 1);
        assert_eq!(stats.count_for(CacheKind::ItemsWithDuration), 1);

        assert_eq!(cache.clear(Some(CacheKind::ItemsWithDuration)).unwrap(), 1);
        assert_eq!(cache.stats().unwrap().count, 1);
    }
}

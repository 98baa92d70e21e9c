use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{CacheError, CacheKey, CacheKind, CacheStore};

/// In-memory cache backend, used by tests and cache-less runs.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<BTreeMap<CacheKey, Vec<u8>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<CacheKey, Vec<u8>>> {
        // A poisoned map is still consistent: every operation is a single insert/remove.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError> {
        self.lock().insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.lock().remove(key).is_some())
    }

    fn entries(&self, kind: Option<CacheKind>) -> Result<Vec<(CacheKey, u64)>, CacheError> {
        Ok(self
            .lock()
            .iter()
            .filter(|(key, _)| kind.is_none_or(|kind| key.kind == kind))
            .map(|(key, bytes)| (key.clone(), bytes.len() as u64))
            .collect())
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use kinesync_config::{ConfigError, ConfigStore};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share state. Every `load_raw`/`save_raw` attempt is counted,
/// including ones that fail.
///
/// # Example
///
/// ```
/// use kinesync_dry_tests::InMemoryConfigStore;
/// use kinesync_config::{ConfigService, DaemonPrefs};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// service.save(DaemonPrefs::KEY, &DaemonPrefs::default()).unwrap();
/// assert_eq!(store.load_count(), 0);
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the document `json` under `key`.
    pub fn with_json(key: &str, json: &str) -> Self {
        let store = Self::new();
        store
            .lock()
            .data
            .insert(key.to_owned(), json.as_bytes().to_vec());
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make subsequent loads fail with `ConfigError::Other`.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Make subsequent saves fail with `ConfigError::Other`.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Number of `load_raw` attempts.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` attempts.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Raw blob stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }

    /// Check if a key exists in the store.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().data.contains_key(key)
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_on_load {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.data.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_on_save {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.data.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_data_and_counters() {
        let a = InMemoryConfigStore::new();
        let b = a.clone();
        a.save_raw("k", b"v").unwrap();
        assert_eq!(b.load_raw("k").unwrap(), b"v");
        assert_eq!(a.load_count(), 1);
        assert_eq!(b.save_count(), 1);
    }

    #[test]
    fn failures_still_count_and_store_nothing() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_save(true);
        assert!(matches!(store.save_raw("k", b"v"), Err(ConfigError::Other(_))));
        assert_eq!(store.save_count(), 1);
        assert!(!store.contains_key("k"));

        store.set_fail_on_load(true);
        assert!(matches!(store.load_raw("k"), Err(ConfigError::Other(_))));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = InMemoryConfigStore::with_json("present", "{}");
        assert!(matches!(store.load_raw("absent"), Err(ConfigError::NotFound)));
        assert_eq!(store.raw("present").unwrap(), b"{}");
    }
}

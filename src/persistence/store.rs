use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Storage, StorageError};

/// A typed value backed by a storage key. Mutations only mark it dirty; `flush` writes.
#[derive(Debug, Clone)]
pub struct PersistentStore<T> {
    key: String,
    value: T,
    dirty: bool,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    /// Load `key`, falling back to `default` when it is missing or unreadable
    pub fn load(storage: &dyn Storage, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match storage.get(&key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Ignoring corrupt value for {key}: {e}");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::warn!("Could not read {key}: {e}");
                default
            }
        };
        Self {
            key,
            value,
            dirty: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        if value != self.value {
            self.value = value;
            self.dirty = true;
        }
    }

    /// Replace the value with `f(current)`
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value);
        self.set(next);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the value if it changed since the last flush
    pub fn flush(&mut self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string(&self.value)?;
        storage.set(&self.key, &json)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_defaults_and_corrupt_values() {
        let mut storage = MemoryStorage::new();
        let store = PersistentStore::load(&storage, "missing", 7u64);
        assert_eq!(*store.get(), 7);
        assert!(!store.is_dirty());

        storage.set("corrupt", "{not json").unwrap();
        let store = PersistentStore::load(&storage, "corrupt", 3u64);
        assert_eq!(*store.get(), 3);
    }

    #[test]
    fn test_writes_are_deferred_until_flush() {
        let mut storage = MemoryStorage::new();
        let mut store = PersistentStore::load(&storage, "score", 0u64);

        store.update(|v| v + 10);
        assert!(store.is_dirty());
        assert_eq!(storage.get("score").unwrap(), None);

        store.flush(&mut storage).unwrap();
        assert!(!store.is_dirty());
        assert_eq!(storage.get("score").unwrap().as_deref(), Some("10"));

        let reloaded = PersistentStore::load(&storage, "score", 0u64);
        assert_eq!(*reloaded.get(), 10);
    }

    #[test]
    fn test_unchanged_value_stays_clean() {
        let storage = MemoryStorage::new();
        let mut store = PersistentStore::load(&storage, "score", 5u64);
        store.set(5);
        store.update(|v| *v);
        assert!(!store.is_dirty());
    }
}

//! Key/value persistence
//!
//! Values are stored as JSON strings under stable keys. Backends:
//! - [`MemoryStorage`]: in-process map, used by tests and when nothing durable is available
//! - [`FileStorage`]: one JSON file per key in a directory (native)
//! - `LocalStorage`: browser LocalStorage (wasm32)
//!
//! [`PersistentStore`] keeps a typed value in memory and writes it back only on `flush`.

use std::collections::BTreeMap;

use thiserror::Error;

mod file;
mod store;
#[cfg(target_arch = "wasm32")]
mod web;

pub use file::FileStorage;
pub use store::PersistentStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", "1").unwrap();
        storage.set("a", "2").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);

        storage.remove("a").unwrap();
        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }
}

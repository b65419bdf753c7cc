//! Per-game hi-scores
//!
//! One persisted number per game id, stored under `"{id}_hiscore"`. Stores are loaded
//! lazily the first time a game asks for its entry.

use std::collections::BTreeMap;

use crate::persistence::{PersistentStore, Storage, StorageError};

pub fn hiscore_key(game_id: &str) -> String {
    format!("{game_id}_hiscore")
}

#[derive(Debug, Default)]
pub struct HiScores {
    stores: BTreeMap<String, PersistentStore<u64>>,
}

impl HiScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for `game_id`, loading it on first access
    pub fn entry(&mut self, storage: &dyn Storage, game_id: &str) -> &mut PersistentStore<u64> {
        self.stores.entry(game_id.to_owned()).or_insert_with(|| {
            let store = PersistentStore::load(storage, hiscore_key(game_id), 0);
            log::info!("Hi-score for {game_id}: {}", store.get());
            store
        })
    }

    /// Best score seen for `game_id`, if it has been loaded
    pub fn get(&self, game_id: &str) -> Option<u64> {
        self.stores.get(game_id).map(|s| *s.get())
    }

    /// Record `score`, keeping the maximum. Returns the hi-score afterwards.
    pub fn submit(&mut self, storage: &dyn Storage, game_id: &str, score: u64) -> u64 {
        let store = self.entry(storage, game_id);
        store.update(|best| (*best).max(score));
        *store.get()
    }

    /// Write every changed store. Keeps going past failures and returns the first one.
    pub fn flush(&mut self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        let mut first_error = None;
        for store in self.stores.values_mut() {
            if let Err(e) = store.flush(storage) {
                log::warn!("Failed to save {}: {e}", store.key());
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_submit_keeps_maximum() {
        let mut storage = MemoryStorage::new();
        let mut scores = HiScores::new();
        assert_eq!(scores.get("pong"), None);

        assert_eq!(scores.submit(&storage, "pong", 300), 300);
        assert_eq!(scores.submit(&storage, "pong", 100), 300);
        assert_eq!(scores.get("pong"), Some(300));

        scores.flush(&mut storage).unwrap();
        assert_eq!(storage.get("pong_hiscore").unwrap().as_deref(), Some("300"));
    }

    #[test]
    fn test_loads_existing_value() {
        let mut storage = MemoryStorage::new();
        storage.set(&hiscore_key("car-racing"), "4200").unwrap();

        let mut scores = HiScores::new();
        assert_eq!(*scores.entry(&storage, "car-racing").get(), 4200);
        assert_eq!(scores.submit(&storage, "car-racing", 10), 4200);
    }
}

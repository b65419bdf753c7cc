//! Which gamepad plays which player, remembered per game

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistentStore, Storage, StorageError};

/// Player slot a pad is assigned to. `0` means the pad is known but unused.
pub type PlayerId = u8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedPad {
    /// Layout revision of the stored entry; older entries prompt again
    pub version: u32,
    pub gamepad_id: String,
    pub player: PlayerId,
}

pub fn pairing_key(game_id: &str) -> String {
    format!("{game_id}-gamepad-settings")
}

/// Persisted map of gamepad index to pairing
#[derive(Debug, Clone)]
pub struct GamepadPairing {
    store: PersistentStore<BTreeMap<usize, PairedPad>>,
}

impl GamepadPairing {
    pub fn load(storage: &dyn Storage, game_id: &str) -> Self {
        Self {
            store: PersistentStore::load(storage, pairing_key(game_id), BTreeMap::new()),
        }
    }

    pub fn get(&self, index: usize) -> Option<&PairedPad> {
        self.store.get().get(&index)
    }

    /// True when `index` is already paired to the same pad with a current layout,
    /// so there is no need to ask again
    pub fn is_known(&self, index: usize, gamepad_id: &str, version: u32) -> bool {
        self.get(index)
            .is_some_and(|p| p.version >= version && p.gamepad_id == gamepad_id)
    }

    /// Pair `index` with `player`. A player owns at most one pad, so any other pad
    /// paired to the same player is forgotten.
    pub fn pair_gamepad(&mut self, index: usize, gamepad_id: &str, player: PlayerId, version: u32) {
        self.store.update(|pads| {
            let mut pads = pads.clone();
            pads.retain(|_, p| p.player != player);
            pads.insert(
                index,
                PairedPad {
                    version,
                    gamepad_id: gamepad_id.to_owned(),
                    player,
                },
            );
            pads
        });
    }

    /// Pad index paired to `player`
    pub fn gamepad_for_player(&self, player: PlayerId) -> Option<usize> {
        self.store
            .get()
            .iter()
            .find(|(_, p)| p.player == player)
            .map(|(index, _)| *index)
    }

    pub fn flush(&mut self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        self.store.flush(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_pairing_replaces_previous_pad_for_player() {
        let storage = MemoryStorage::new();
        let mut pairing = GamepadPairing::load(&storage, "pong");

        pairing.pair_gamepad(0, "pad-a", 1, 1);
        pairing.pair_gamepad(1, "pad-b", 2, 1);
        assert_eq!(pairing.gamepad_for_player(1), Some(0));
        assert_eq!(pairing.gamepad_for_player(2), Some(1));

        pairing.pair_gamepad(2, "pad-c", 1, 1);
        assert_eq!(pairing.gamepad_for_player(1), Some(2));
        assert!(pairing.get(0).is_none());
        assert_eq!(pairing.gamepad_for_player(3), None);
    }

    #[test]
    fn test_known_pads_and_persistence() {
        let mut storage = MemoryStorage::new();
        let mut pairing = GamepadPairing::load(&storage, "pong");
        pairing.pair_gamepad(0, "pad-a", 0, 1);

        assert!(pairing.is_known(0, "pad-a", 1));
        assert!(!pairing.is_known(0, "pad-b", 1));
        assert!(!pairing.is_known(0, "pad-a", 2));

        pairing.flush(&mut storage).unwrap();
        assert!(storage.get("pong-gamepad-settings").unwrap().is_some());

        let reloaded = GamepadPairing::load(&storage, "pong");
        assert_eq!(reloaded.get(0), pairing.get(0));
    }
}

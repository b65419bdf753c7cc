//! Player preferences
//!
//! Persisted as JSON under a single storage key, separately from hi-scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Host draws unlit blocks as dim cells instead of leaving them blank
    pub blocks_background: bool,
    /// Wipe transitions between rounds; off restarts immediately
    pub blocks_transition: bool,
    /// Verbose per-frame logging
    pub debug_mode: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no splash decoration, no rumble)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blocks_background: true,
            blocks_transition: true,
            debug_mode: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "block_arcade_settings";

    /// Effective transitions (respects reduced_motion)
    pub fn effective_transition(&self) -> bool {
        self.blocks_transition && !self.reduced_motion
    }

    /// Whether decorative effects (swirl, flash) should play
    pub fn effective_decorations(&self) -> bool {
        !self.reduced_motion
    }

    /// Whether gamepads may rumble
    pub fn effective_rumble(&self) -> bool {
        !self.reduced_motion
    }

    /// Combined sound effect volume, zero when muted
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Stored settings are corrupt, using defaults: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {e}"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        storage.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        let settings = Settings {
            muted: true,
            reduced_motion: true,
            ..Settings::default()
        };
        settings.save(&mut storage).unwrap();
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(Settings::STORAGE_KEY, r#"{"debug_mode":true}"#).unwrap();
        let settings = Settings::load(&storage);
        assert!(settings.debug_mode);
        assert!(settings.blocks_transition);
    }

    #[test]
    fn test_effective_flags() {
        let mut settings = Settings::default();
        assert!(settings.effective_transition());
        assert!((settings.effective_volume() - 0.8).abs() < f32::EPSILON);

        settings.reduced_motion = true;
        assert!(!settings.effective_transition());
        assert!(!settings.effective_rumble());

        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }
}

//! Sound effects
//!
//! Games ask the [`AudioManager`] for a player and fire it; there is no feedback path.
//! Backends implement [`AudioPlayer`]: [`LogPlayer`] everywhere, and on wasm32 a
//! procedural Web Audio synth (no sound files needed).

use std::collections::HashMap;

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioType {
    /// Menu navigation
    Click,
    /// Ball hits paddle
    Hit,
    /// Point scored
    PickupCoin,
    Explosion,
    LaserShoot,
}

impl AudioType {
    pub const ALL: [AudioType; 5] = [
        AudioType::Click,
        AudioType::Hit,
        AudioType::PickupCoin,
        AudioType::Explosion,
        AudioType::LaserShoot,
    ];
}

/// A playable sound
pub trait AudioPlayer {
    fn play(&self, volume: f32);
    fn stop(&self);
}

/// Backend that only logs, for headless runs
#[derive(Debug, Clone, Copy)]
pub struct LogPlayer {
    kind: AudioType,
}

impl LogPlayer {
    pub fn new(kind: AudioType) -> Self {
        Self { kind }
    }
}

impl AudioPlayer for LogPlayer {
    fn play(&self, volume: f32) {
        log::debug!("play {:?} at volume {volume:.2}", self.kind);
    }

    fn stop(&self) {
        log::trace!("stop {:?}", self.kind);
    }
}

/// A registered player bound to the current effective volume
pub struct AudioHandle<'a> {
    player: &'a dyn AudioPlayer,
    volume: f32,
}

impl AudioHandle<'_> {
    pub fn play(&self) {
        self.player.play(self.volume);
    }

    pub fn stop(&self) {
        self.player.stop();
    }
}

/// Audio manager for the arcade
pub struct AudioManager {
    players: HashMap<AudioType, Box<dyn AudioPlayer>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Manager with no players registered
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Manager with a [`LogPlayer`] for every sound
    pub fn with_log_players() -> Self {
        let mut manager = Self::new();
        for kind in AudioType::ALL {
            manager.register(kind, Box::new(LogPlayer::new(kind)));
        }
        manager
    }

    pub fn register(&mut self, kind: AudioType, player: Box<dyn AudioPlayer>) {
        self.players.insert(kind, player);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Player for `kind`. `None` when nothing is registered or nothing would be heard.
    pub fn get_audio_player(&self, kind: AudioType) -> Option<AudioHandle<'_>> {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return None;
        }
        self.players.get(&kind).map(|player| AudioHandle {
            player: player.as_ref(),
            volume,
        })
    }

    /// Fire-and-forget shorthand
    pub fn play(&self, kind: AudioType) {
        if let Some(player) = self.get_audio_player(kind) {
            player.play();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioPlayer;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioManager, AudioPlayer, AudioType};

    /// Procedurally generated sound on a shared Web Audio context
    pub struct WebAudioPlayer {
        ctx: AudioContext,
        kind: AudioType,
    }

    impl WebAudioPlayer {
        /// Register a player for every sound on one shared context.
        /// False when no AudioContext can be created (e.g. insecure context).
        pub fn register_all(manager: &mut AudioManager) -> bool {
            let Ok(ctx) = AudioContext::new() else {
                log::warn!("Failed to create AudioContext - audio disabled");
                return false;
            };
            for kind in AudioType::ALL {
                manager.register(
                    kind,
                    Box::new(Self {
                        ctx: ctx.clone(),
                        kind,
                    }),
                );
            }
            true
        }

        /// Create an oscillator with gain envelope
        fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single tone with an exponential decay and optional pitch sweep
        fn tone(&self, from: f32, to: f32, osc_type: OscillatorType, vol: f32, length: f64) {
            let Some((osc, gain)) = self.create_osc(from, osc_type) else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }
    }

    impl AudioPlayer for WebAudioPlayer {
        fn play(&self, vol: f32) {
            // Browsers start the context suspended until a user gesture
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }

            match self.kind {
                AudioType::Click => self.tone(800.0, 800.0, OscillatorType::Square, vol * 0.15, 0.03),
                AudioType::Hit => self.tone(150.0, 60.0, OscillatorType::Sine, vol * 0.6, 0.1),
                AudioType::PickupCoin => {
                    for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
                        let delay = i as f64 * 0.08;
                        if let Some((osc, gain)) = self.create_osc(*freq, OscillatorType::Sine) {
                            let t = self.ctx.current_time() + delay;
                            gain.gain().set_value_at_time(vol * 0.25, t).ok();
                            gain.gain()
                                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                                .ok();
                            osc.start_with_when(t).ok();
                            osc.stop_with_when(t + 0.2).ok();
                        }
                    }
                }
                AudioType::Explosion => {
                    self.tone(100.0, 30.0, OscillatorType::Sawtooth, vol * 0.5, 0.4);
                    // High frequency crack
                    self.tone(1500.0, 1500.0, OscillatorType::Square, vol * 0.2, 0.1);
                }
                AudioType::LaserShoot => self.tone(1200.0, 200.0, OscillatorType::Square, vol * 0.2, 0.12),
            }
        }

        fn stop(&self) {
            // Every sound is a short one-shot that stops itself
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<f32>>>);

    impl AudioPlayer for Recorder {
        fn play(&self, volume: f32) {
            self.0.borrow_mut().push(volume);
        }

        fn stop(&self) {}
    }

    #[test]
    fn test_unregistered_type_has_no_player() {
        let manager = AudioManager::new();
        assert!(manager.get_audio_player(AudioType::Hit).is_none());
        manager.play(AudioType::Hit);
    }

    #[test]
    fn test_play_uses_effective_volume() {
        let plays = Rc::new(RefCell::new(Vec::new()));
        let mut manager = AudioManager::new();
        manager.register(AudioType::Hit, Box::new(Recorder(plays.clone())));
        manager.set_master_volume(0.5);
        manager.set_sfx_volume(0.5);

        manager.play(AudioType::Hit);
        assert_eq!(*plays.borrow(), vec![0.25]);
    }

    #[test]
    fn test_muted_returns_none() {
        let mut manager = AudioManager::with_log_players();
        assert!(manager.get_audio_player(AudioType::Explosion).is_some());

        manager.apply_settings(&Settings {
            muted: true,
            ..Settings::default()
        });
        assert!(manager.get_audio_player(AudioType::Explosion).is_none());

        manager.set_muted(false);
        manager.set_master_volume(0.0);
        assert!(manager.get_audio_player(AudioType::Explosion).is_none());
    }
}

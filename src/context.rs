//! Shared services for brains
//!
//! The host creates one [`AppContext`] and lends each brain a [`BrainContext`]: a view
//! scoped to that brain's game id and grids, borrowed fresh for every call.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioManager, AudioType};
use crate::highscores::HiScores;
use crate::persistence::{MemoryStorage, PersistentStore, Storage};
use crate::platform::{Gamepads, Keyboard, ModalQueue};
use crate::settings::Settings;
use crate::sim::grid::GridSurface;

pub struct AppContext {
    pub keyboard: Keyboard,
    pub gamepads: Gamepads,
    pub modals: ModalQueue,
    pub audio: AudioManager,
    pub settings: Settings,
    /// Settings as last written, to detect changes at flush time
    saved_settings: Settings,
    pub hiscores: HiScores,
    pub storage: Box<dyn Storage>,
    pub rng: Pcg32,
    requested_game: Option<String>,
}

impl AppContext {
    /// Load settings from `storage` and apply them to `audio`
    pub fn new(storage: Box<dyn Storage>, mut audio: AudioManager, seed: u64) -> Self {
        let settings = Settings::load(&*storage);
        audio.apply_settings(&settings);
        Self {
            keyboard: Keyboard::new(),
            gamepads: Gamepads::new(),
            modals: ModalQueue::new(),
            audio,
            saved_settings: settings.clone(),
            settings,
            hiscores: HiScores::new(),
            storage,
            rng: Pcg32::seed_from_u64(seed),
            requested_game: None,
        }
    }

    /// In-memory context with logging audio, for tests and headless runs
    pub fn in_memory(seed: u64) -> Self {
        Self::new(Box::new(MemoryStorage::new()), AudioManager::with_log_players(), seed)
    }

    pub fn request_game(&mut self, id: impl Into<String>) {
        self.requested_game = Some(id.into());
    }

    pub fn take_requested_game(&mut self) -> Option<String> {
        self.requested_game.take()
    }

    /// Borrow a view for the brain `id`, drawing into `grid` and `mini`
    pub fn brain_context<'a>(
        &'a mut self,
        id: &'a str,
        grid: &'a mut dyn GridSurface,
        mini: &'a mut dyn GridSurface,
    ) -> BrainContext<'a> {
        let AppContext {
            keyboard,
            gamepads,
            modals,
            audio,
            settings,
            hiscores,
            storage,
            rng,
            requested_game,
            ..
        } = self;
        let hiscore = hiscores.entry(&**storage, id);
        BrainContext {
            id,
            grid,
            mini,
            keyboard,
            gamepads,
            modals,
            audio,
            settings,
            hiscore,
            storage: &mut **storage,
            rng,
            requested_game,
        }
    }

    /// Write hi-scores, and settings if they changed. Failures are logged and retried next flush.
    pub fn flush(&mut self) {
        if let Err(e) = self.hiscores.flush(&mut *self.storage) {
            log::warn!("Failed to save hi-scores: {e}");
        }
        if self.settings != self.saved_settings {
            self.audio.apply_settings(&self.settings);
            match self.settings.save(&mut *self.storage) {
                Ok(()) => self.saved_settings = self.settings.clone(),
                Err(e) => log::warn!("Failed to save settings: {e}"),
            }
        }
    }
}

/// What a brain may touch during one call
pub struct BrainContext<'a> {
    /// Game id of the brain being driven
    pub id: &'a str,
    pub grid: &'a mut dyn GridSurface,
    /// Auxiliary display (health, lives)
    pub mini: &'a mut dyn GridSurface,
    pub keyboard: &'a mut Keyboard,
    pub gamepads: &'a mut Gamepads,
    pub modals: &'a mut ModalQueue,
    pub audio: &'a AudioManager,
    pub settings: &'a Settings,
    pub hiscore: &'a mut PersistentStore<u64>,
    pub storage: &'a mut dyn Storage,
    pub rng: &'a mut Pcg32,
    requested_game: &'a mut Option<String>,
}

impl BrainContext<'_> {
    /// Ask the host to switch games after this frame
    pub fn request_game(&mut self, id: impl Into<String>) {
        *self.requested_game = Some(id.into());
    }

    pub fn play(&self, kind: AudioType) {
        self.audio.play(kind);
    }

    /// Rumble one pad, unless rumble is disabled. False when nothing vibrated.
    pub fn vibrate(&mut self, index: usize, intensity: f32, duration: f64) -> bool {
        self.settings.effective_rumble() && self.gamepads.vibrate(index, intensity, duration)
    }

    /// Rumble every connected pad
    pub fn vibrate_all(&mut self, intensity: f32, duration: f64) {
        for index in self.gamepads.indexes() {
            self.vibrate(index, intensity, duration);
        }
    }

    /// Keep the best score for this game. Returns the hi-score afterwards.
    pub fn submit_score(&mut self, score: u64) -> u64 {
        self.hiscore.update(|best| (*best).max(score));
        *self.hiscore.get()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::consts::{GRID_HEIGHT, GRID_WIDTH, MINI_GRID_SIZE};
    use crate::sim::brain::Brain;
    use crate::sim::grid::BlockGrid;

    /// Owns everything a brain needs so tests can drive it frame by frame
    pub struct Harness {
        pub app: AppContext,
        pub grid: BlockGrid,
        pub mini: BlockGrid,
    }

    impl Harness {
        pub fn new(seed: u64) -> Self {
            Self {
                app: AppContext::in_memory(seed),
                grid: BlockGrid::new(GRID_WIDTH, GRID_HEIGHT),
                mini: BlockGrid::new(MINI_GRID_SIZE, MINI_GRID_SIZE),
            }
        }

        pub fn start(&mut self, brain: &mut dyn Brain) {
            let id = brain.id().to_owned();
            let mut ctx = self.app.brain_context(&id, &mut self.grid, &mut self.mini);
            brain.start(&mut ctx);
        }

        /// One frame at `now`, ending the input frame afterwards like the host does
        pub fn update(&mut self, brain: &mut dyn Brain, now: f64) {
            let id = brain.id().to_owned();
            let mut ctx = self.app.brain_context(&id, &mut self.grid, &mut self.mini);
            brain.update(&mut ctx, now);
            self.app.keyboard.end_frame();
        }

        pub fn stop(&mut self, brain: &mut dyn Brain) {
            let id = brain.id().to_owned();
            let mut ctx = self.app.brain_context(&id, &mut self.grid, &mut self.mini);
            brain.stop(&mut ctx);
        }

        /// Run frames every `step` ms from `from` until `until`, returning the last timestamp
        pub fn run(&mut self, brain: &mut dyn Brain, from: f64, until: f64, step: f64) -> f64 {
            let mut now = from;
            while now < until {
                now += step;
                self.update(brain, now);
            }
            now
        }
    }
}

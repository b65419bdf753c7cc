//! The host: owns the grids and the active brain, and switches games on request
//!
//! Per frame:
//! 1. A requested game id different from the current one stops the active brain, clears
//!    both grids and starts a cancelable load (the menu and splash screen are built
//!    directly).
//! 2. A finished load resizes the main grid to the new brain and starts it.
//! 3. The active brain is updated; a brain that stopped itself sends the host back to the menu.
//! 4. The input frame ends and dirty settings and hi-scores are written.

use std::rc::Rc;

use crate::context::AppContext;
use crate::consts::{GRID_HEIGHT, GRID_WIDTH, MINI_GRID_SIZE};
use crate::games::{GameMenu, SplashScreen, menu, splash};
use crate::sim::brain::{Brain, BrainState, Score};
use crate::sim::grid::{BlockGrid, GridSurface};
use crate::sim::loader::{GameFactory, GameRegistry, LoadError, PendingLoad};

pub struct Arcade {
    app: AppContext,
    grid: BlockGrid,
    mini: BlockGrid,
    registry: Rc<GameRegistry>,
    active: Option<Box<dyn Brain>>,
    /// Id of the active brain, or of the game being loaded
    current_id: String,
    pending: Option<PendingLoad<GameFactory>>,
}

impl Arcade {
    /// Host showing the splash screen
    pub fn new(app: AppContext, registry: GameRegistry) -> Self {
        let mut arcade = Self {
            app,
            grid: BlockGrid::new(GRID_WIDTH, GRID_HEIGHT),
            mini: BlockGrid::new(MINI_GRID_SIZE, MINI_GRID_SIZE),
            registry: Rc::new(registry),
            active: None,
            current_id: String::new(),
            pending: None,
        };
        arcade.switch_to(splash::ID);
        arcade
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Input, settings and modals are fed through here
    pub fn app_mut(&mut self) -> &mut AppContext {
        &mut self.app
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn mini(&self) -> &BlockGrid {
        &self.mini
    }

    /// Main grid as text. Unlit blocks show only with the background setting on.
    pub fn render(&self) -> String {
        let unlit = if self.app.settings.blocks_background { '.' } else { ' ' };
        self.grid.render('#', unlit)
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Id of the running brain. `None` while a game is loading.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref().map(|brain| brain.id())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Score of the running game, if it keeps one
    pub fn score(&self) -> Option<&Score> {
        self.active.as_deref().and_then(|brain| brain.score())
    }

    pub fn hiscore(&self) -> Option<u64> {
        self.app.hiscores.get(&self.current_id)
    }

    /// Advance everything by one frame at timestamp `now` (milliseconds)
    pub fn frame(&mut self, now: f64) {
        if let Some(id) = self.app.take_requested_game() {
            if id != self.current_id || (self.active.is_none() && self.pending.is_none()) {
                self.switch_to(&id);
            }
        }

        self.poll_pending();

        let stopped = match self.active.as_mut() {
            Some(brain) => {
                let mut ctx = self.app.brain_context(&self.current_id, &mut self.grid, &mut self.mini);
                brain.update(&mut ctx, now);
                brain.state() == BrainState::Stopped
            }
            None => false,
        };
        if self.app.settings.debug_mode {
            log::debug!("{} at {now:.0}ms: {} blocks lit", self.current_id, self.grid.lit_count());
        }
        if stopped {
            log::info!("{} stopped, back to the menu", self.current_id);
            self.switch_to(menu::ID);
        }

        self.app.keyboard.end_frame();
        self.app.flush();
    }

    /// Stop the active brain and bring up `id`
    pub fn switch_to(&mut self, id: &str) {
        if let Some(load) = self.pending.take() {
            log::debug!("Canceling load of {}", self.current_id);
            load.cancel();
        }
        if let Some(mut brain) = self.active.take() {
            let mut ctx = self.app.brain_context(&self.current_id, &mut self.grid, &mut self.mini);
            brain.stop(&mut ctx);
        }
        self.grid.clear_all();
        self.mini.clear_all();
        self.current_id = id.to_owned();

        match id {
            menu::ID => self.activate(Box::new(GameMenu::new(Rc::clone(&self.registry)))),
            splash::ID => self.activate(Box::new(SplashScreen::new())),
            _ => {
                log::info!("Loading {id}");
                self.pending = Some(self.registry.load_game(id));
            }
        }
    }

    fn poll_pending(&mut self) {
        let Some(result) = self.pending.as_mut().and_then(PendingLoad::poll) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(factory) => self.activate(factory()),
            Err(LoadError::Canceled) => log::trace!("Dropped canceled load of {}", self.current_id),
            Err(e) => {
                log::error!("Failed to load {}: {e}", self.current_id);
                self.switch_to(menu::ID);
            }
        }
    }

    fn activate(&mut self, mut brain: Box<dyn Brain>) {
        let size = brain.grid_size();
        if size.x != self.grid.width() || size.y != self.grid.height() {
            self.grid.resize(size.x, size.y);
        }
        self.current_id = brain.id().to_owned();
        {
            let mut ctx = self.app.brain_context(&self.current_id, &mut self.grid, &mut self.mini);
            brain.start(&mut ctx);
        }
        log::info!("Started {}", self.current_id);
        self.active = Some(brain);
    }
}

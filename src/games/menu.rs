//! Game picker
//!
//! Left/right cycles through the registered games, space launches the selection. Each
//! selection shows a spinning letter, a picture of the game and its number; the letter and
//! picture arrive through cancelable loads so a fast scroll never shows stale art.

use std::rc::Rc;

use crate::audio::AudioType;
use crate::context::BrainContext;
use crate::platform::{Button, Edge, Key, ListenerId};
use crate::sim::animation::{Animation, AnimationState, Animator};
use crate::sim::brain::{Brain, BrainState};
use crate::sim::effects::number_sprite;
use crate::sim::entity::{Entity, Sprite};
use crate::sim::grid::Rect;
use crate::sim::loader::{GameRegistry, LoadError, MenuArt, PendingLoad};

pub const ID: &str = "menu";

const NUMBER_Y: i32 = 15;

#[derive(Debug, Clone, Copy)]
struct Listeners {
    left: ListenerId,
    right: ListenerId,
    select: ListenerId,
    pad_left: ListenerId,
    pad_right: ListenerId,
    pad_select: ListenerId,
}

pub struct GameMenu {
    registry: Rc<GameRegistry>,
    state: BrainState,
    selected: usize,
    listeners: Option<Listeners>,
    letter_load: Option<PendingLoad<Animation>>,
    art_load: Option<PendingLoad<MenuArt>>,
    letter: Option<Animator>,
    art: Option<Animator>,
    number: Option<Entity>,
}

impl GameMenu {
    pub fn new(registry: Rc<GameRegistry>) -> Self {
        Self {
            registry,
            state: BrainState::Created,
            selected: 0,
            listeners: None,
            letter_load: None,
            art_load: None,
            letter: None,
            art: None,
            number: None,
        }
    }

    /// Id of the highlighted game
    pub fn selected_id(&self) -> Option<&str> {
        self.registry.id_at(self.selected)
    }

    fn select(&mut self, ctx: &mut BrainContext<'_>, index: usize) {
        self.selected = index;
        self.cancel_loads();
        for animator in [self.letter.take(), self.art.take()].into_iter().flatten() {
            animator.clear(ctx.grid);
        }
        if let Some(number) = self.number.take() {
            number.clear(ctx.grid);
        }

        let Some(id) = self.registry.id_at(index) else {
            return;
        };
        log::debug!("Menu selected {id}");

        let letter = char::from(b'a' + (index % 26) as u8);
        self.letter_load = Some(self.registry.load_letter(letter));
        self.art_load = Some(self.registry.load_menu_art(id));

        let value = u8::try_from(index + 1).unwrap_or(u8::MAX);
        self.number = Some(Entity::new(ctx.grid, 0, NUMBER_Y, number_sprite(value), None));
    }

    fn cancel_loads(&mut self) {
        if let Some(load) = self.letter_load.take() {
            load.cancel();
        }
        if let Some(load) = self.art_load.take() {
            load.cancel();
        }
    }

    fn step(&mut self, delta: isize, ctx: &mut BrainContext<'_>) {
        let count = self.registry.len() as isize;
        if count == 0 {
            return;
        }
        let index = (self.selected as isize + delta).rem_euclid(count) as usize;
        ctx.play(AudioType::Click);
        self.select(ctx, index);
    }

    fn poll_loads(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(result) = self.letter_load.as_mut().and_then(PendingLoad::poll) {
            self.letter_load = None;
            let x = ctx.grid.width() / 2 - 3;
            match result.and_then(|animation| build(ctx, x, 0, Vec::new(), animation, None)) {
                Ok(animator) => self.letter = Some(animator),
                Err(e) => report("letter animation", &e),
            }
        }

        if let Some(result) = self.art_load.as_mut().and_then(PendingLoad::poll) {
            self.art_load = None;
            match result.and_then(|art| build(ctx, art.x, art.y, art.sprite, art.animation, art.clear_square)) {
                Ok(animator) => self.art = Some(animator),
                Err(e) => report("game animation", &e),
            }
        }
    }
}

fn build(
    ctx: &mut BrainContext<'_>,
    x: i32,
    y: i32,
    sprite: Sprite,
    animation: Animation,
    clear_square: Option<Rect>,
) -> Result<Animator, LoadError> {
    Animator::build(ctx.grid, x, y, sprite, animation, clear_square)
        .map_err(|e| LoadError::Failed(e.to_string()))
}

/// Canceled loads are expected whenever the selection moves on
fn report(what: &str, e: &LoadError) {
    if e.is_canceled() {
        log::trace!("Dropped stale {what}");
    } else {
        log::error!("Failed loading {what}: {e}");
    }
}

impl Brain for GameMenu {
    fn id(&self) -> &str {
        ID
    }

    fn state(&self) -> BrainState {
        self.state
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.listeners = Some(Listeners {
            left: ctx.keyboard.on_key_down(Key::ArrowLeft),
            right: ctx.keyboard.on_key_down(Key::ArrowRight),
            select: ctx.keyboard.on_key_down(Key::Space),
            pad_left: ctx.gamepads.add_button_listener(Button::DPadLeft, Edge::Down, None),
            pad_right: ctx.gamepads.add_button_listener(Button::DPadRight, Edge::Down, None),
            pad_select: ctx.gamepads.add_button_listener(Button::A, Edge::Down, None),
        });
        self.select(ctx, self.selected);
        self.state = BrainState::Started;
        log::info!("Game menu started with {} games", self.registry.len());
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if !self.state.is_active() {
            return;
        }
        self.state = BrainState::Running;

        if let Some(l) = self.listeners {
            let left = ctx.keyboard.drain(l.left) as usize + ctx.gamepads.drain_buttons(l.pad_left).len();
            let right = ctx.keyboard.drain(l.right) as usize + ctx.gamepads.drain_buttons(l.pad_right).len();
            let select = ctx.keyboard.drain(l.select) as usize + ctx.gamepads.drain_buttons(l.pad_select).len();

            let delta = right as isize - left as isize;
            if delta != 0 {
                self.step(delta, ctx);
            }
            if select > 0 {
                if let Some(id) = self.selected_id().map(str::to_owned) {
                    log::info!("Menu launching {id}");
                    ctx.request_game(id);
                }
            }
        }

        self.poll_loads(ctx);

        for animator in [self.letter.as_mut(), self.art.as_mut()].into_iter().flatten() {
            if animator.state() != AnimationState::Finished {
                animator.update(ctx.grid, now);
            }
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.cancel_loads();
        if let Some(l) = self.listeners.take() {
            for id in [l.left, l.right, l.select] {
                ctx.keyboard.remove_listener(id);
            }
            for id in [l.pad_left, l.pad_right, l.pad_select] {
                ctx.gamepads.remove_listener(id);
            }
        }
        for animator in [self.letter.take(), self.art.take()].into_iter().flatten() {
            animator.clear(ctx.grid);
        }
        if let Some(number) = self.number.take() {
            number.clear(ctx.grid);
        }
        self.state = BrainState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::Harness;
    use crate::games;
    use crate::sim::grid::GridSurface;
    use crate::sim::loader::GameFactory;
    use crate::sim::loader::testing::{Deferred, deferred};

    fn menu() -> GameMenu {
        GameMenu::new(Rc::new(games::registry()))
    }

    #[test]
    fn test_start_shows_first_game() {
        let mut h = Harness::new(1);
        let mut menu = menu();
        h.start(&mut menu);
        assert_eq!(menu.selected_id(), Some(games::pong::ID));
        assert!(menu.number.is_some());

        h.update(&mut menu, 0.0);
        assert!(menu.letter.is_some());
        assert!(menu.art.is_some());
        assert!(menu.letter_load.is_none());
    }

    #[test]
    fn test_selection_wraps_both_ways() {
        let mut h = Harness::new(1);
        let mut menu = menu();
        h.start(&mut menu);

        h.app.keyboard.press(Key::ArrowLeft);
        h.update(&mut menu, 0.0);
        assert_eq!(menu.selected_id(), Some(games::shoot_bricks::ID));

        h.app.keyboard.release(Key::ArrowLeft);
        h.app.keyboard.press(Key::ArrowRight);
        h.update(&mut menu, 16.0);
        assert_eq!(menu.selected_id(), Some(games::pong::ID));
    }

    #[test]
    fn test_space_requests_selected_game() {
        let mut h = Harness::new(1);
        let mut menu = menu();
        h.start(&mut menu);
        h.app.keyboard.press(Key::ArrowRight);
        h.update(&mut menu, 0.0);
        h.app.keyboard.press(Key::Space);
        h.update(&mut menu, 16.0);
        assert_eq!(h.app.take_requested_game().as_deref(), Some(games::car_racing::ID));
    }

    #[test]
    fn test_stale_art_is_dropped() {
        let mut registry = GameRegistry::new();
        let (slot, _) = deferred::<MenuArt>();
        let slot_for_loader = slot.clone();
        registry.register(
            "slow",
            "Slow",
            || Box::pin(std::future::ready(Ok(games::pong::create as GameFactory))),
            move || Box::pin(Deferred(slot_for_loader.clone())),
        );
        registry.register_ready("fast", "Fast", games::pong::create, games::pong::menu_art);

        let mut h = Harness::new(1);
        let mut menu = GameMenu::new(Rc::new(registry));
        h.start(&mut menu);
        h.update(&mut menu, 0.0);
        assert!(menu.art.is_none());

        // Move on before the slow art arrives, then let it resolve
        h.app.keyboard.press(Key::ArrowRight);
        h.update(&mut menu, 16.0);
        slot.set(Some(games::pong::menu_art()));
        h.update(&mut menu, 32.0);
        assert_eq!(menu.selected_id(), Some("fast"));
        assert!(menu.art.is_some());
        assert!(menu.art_load.is_none());
    }

    #[test]
    fn test_stop_clears_grid_and_listeners() {
        let mut h = Harness::new(1);
        let mut menu = menu();
        h.start(&mut menu);
        h.update(&mut menu, 0.0);
        h.run(&mut menu, 0.0, 2000.0, 16.0);
        assert!(h.grid.lit_count() > 0);

        h.stop(&mut menu);
        assert_eq!(h.grid.lit_count(), 0);
        assert_eq!(h.app.keyboard.listener_count(), 0);
        assert_eq!(h.grid.width(), 10);
    }
}

//! Shoot bricks
//!
//! Rows of bricks drop from the top every second; the ship at the bottom slides left and
//! right and fires while space (or gamepad A) is held. A brick reaching the ship's rows costs
//! one of four lives, shown on the mini grid.

use glam::IVec2;
use rand::Rng;

use crate::audio::AudioType;
use crate::context::BrainContext;
use crate::pad;
use crate::platform::{Button, Key, StickAxis};
use crate::sim::animation::{AnimatedFrames, Animation};
use crate::sim::brain::{Brain, BrainState, Score};
use crate::sim::effects::{WipeDirection, explosion, place_explosion, wipe};
use crate::sim::entity::{CollisionBox, Entity, sprite};
use crate::sim::grid::{GridSurface, Rect};
use crate::sim::loader::MenuArt;
use crate::sim::timer::StepTimer;

pub const ID: &str = "shoot-bricks";

const PLAYER_WIDTH: i32 = 3;
const PLAYER_HEIGHT: i32 = 2;

const PLAYER_MOVE_DELAY: f64 = 50.0;
const SHOOT_DELAY: f64 = 200.0;
const BULLET_MOVE_DELAY: f64 = 4.0;
const ENEMY_MOVE_DELAY: f64 = 1000.0;
/// Chance of a brick in each column of a new row
const ENEMY_DENSITY: f64 = 0.3;
const HIT_POINTS: u64 = 100;

const MAX_HEALTH: u32 = 4;
const WIPE_DELAY: f64 = 100.0;
const MAX_DISPLAY_SCORE: u64 = 999_999;

const SHOT_RUMBLE: (f32, f64) = (1.0, 120.0);
const CRASH_RUMBLE: (f32, f64) = (1.0, 1000.0);

pub fn create() -> Box<dyn Brain> {
    Box::new(ShootBricks::new())
}

/// Ship firing into a falling row
pub fn menu_art() -> MenuArt {
    MenuArt {
        x: 0,
        y: 6,
        sprite: Vec::new(),
        animation: Animation::Framed {
            frames: vec![
                sprite(&[(2, 0), (5, 0), (8, 0), (3, 1), (4, 1), (6, 1), (7, 1), (4, 4), (4, 6), (3, 7), (4, 7), (5, 7)]),
                sprite(&[(2, 0), (5, 0), (8, 0), (3, 1), (4, 1), (6, 1), (7, 1), (4, 2), (4, 6), (3, 7), (4, 7), (5, 7)]),
                sprite(&[(2, 0), (5, 0), (8, 0), (3, 1), (6, 1), (7, 1), (5, 6), (4, 7), (5, 7), (6, 7)]),
                sprite(&[(1, 1), (4, 1), (7, 1), (2, 2), (5, 2), (6, 2), (6, 6), (5, 7), (6, 7), (7, 7)]),
            ],
            delay: 720.0,
            looping: true,
        },
        clear_square: Some(Rect::new(0, 6, crate::consts::GRID_WIDTH, 8)),
    }
}

///   []
/// [][][]
fn ship(grid: &mut dyn GridSurface) -> Entity {
    let x = (grid.width() - PLAYER_WIDTH) / 2;
    let y = grid.height() - PLAYER_HEIGHT;
    Entity::new(
        grid,
        x,
        y,
        sprite(&[(1, 0), (0, 1), (1, 1), (2, 1)]),
        Some(CollisionBox::sized(PLAYER_WIDTH, PLAYER_HEIGHT)),
    )
}

/// Single block with a box, used for both bullets and bricks
fn block(grid: &mut dyn GridSurface, x: i32, y: i32) -> Entity {
    Entity::new(grid, x, y, sprite(&[(0, 0)]), Some(CollisionBox::sized(1, 1)))
}

#[derive(Debug)]
enum Ending {
    Explosion(AnimatedFrames),
    Wipe(AnimatedFrames),
}

pub struct ShootBricks {
    state: BrainState,
    score: Score,
    points: u64,
    health: u32,
    player: Option<Entity>,
    bullets: Vec<Entity>,
    enemies: Vec<Entity>,
    ending: Option<Ending>,
    move_timer: StepTimer,
    bullet_timer: StepTimer,
    enemy_timer: StepTimer,
    /// Time of the last shot while the trigger stays held. Releasing re-arms immediately.
    last_shot: Option<f64>,
}

impl Default for ShootBricks {
    fn default() -> Self {
        Self::new()
    }
}

impl ShootBricks {
    pub fn new() -> Self {
        Self {
            state: BrainState::Created,
            score: Score::default(),
            points: 0,
            health: MAX_HEALTH,
            player: None,
            bullets: Vec::new(),
            enemies: Vec::new(),
            ending: None,
            move_timer: StepTimer::new(PLAYER_MOVE_DELAY),
            bullet_timer: StepTimer::new(BULLET_MOVE_DELAY),
            enemy_timer: StepTimer::new(ENEMY_MOVE_DELAY),
            last_shot: None,
        }
    }

    fn set_points(&mut self, ctx: &mut BrainContext<'_>, points: u64) {
        self.points = points;
        self.score.set(pad(points.min(MAX_DISPLAY_SCORE), 3, ' '));
        ctx.submit_score(points);
    }

    /// Lives as lit blocks along the top row of the mini grid
    fn draw_health(&self, mini: &mut dyn GridSurface) {
        for i in 0..MAX_HEALTH {
            mini.set_block(i as i32, 0, i < self.health);
        }
    }

    fn clear_entities(&mut self, grid: &mut dyn GridSurface) {
        if let Some(player) = self.player.take() {
            player.clear(grid);
        }
        for entity in self.bullets.drain(..).chain(self.enemies.drain(..)) {
            entity.clear(grid);
        }
        match self.ending.take() {
            Some(Ending::Explosion(frames) | Ending::Wipe(frames)) => frames.clear(grid),
            None => {}
        }
    }

    fn restart(&mut self, ctx: &mut BrainContext<'_>) {
        self.clear_entities(ctx.grid);
        self.player = Some(ship(ctx.grid));
        self.last_shot = None;
        self.state = BrainState::Started;
    }

    fn explode(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let size = IVec2::new(ctx.grid.width(), ctx.grid.height());
        let at = place_explosion(player.pos() - IVec2::Y, size);
        self.ending = Some(Ending::Explosion(explosion(ctx.grid, at.x, at.y)));
        ctx.vibrate_all(CRASH_RUMBLE.0, CRASH_RUMBLE.1);
        ctx.play(AudioType::Explosion);
    }

    fn play_ending(&mut self, ctx: &mut BrainContext<'_>, ending: Ending, now: f64) {
        match ending {
            Ending::Explosion(boom) if boom.is_finished() => {
                boom.clear(ctx.grid);
                if ctx.settings.effective_transition() {
                    let transition = wipe(ctx.grid, WipeDirection::BottomToTop, WIPE_DELAY);
                    self.ending = Some(Ending::Wipe(transition));
                } else {
                    self.next_round(ctx);
                }
            }
            Ending::Wipe(transition) if transition.is_finished() => {
                transition.clear(ctx.grid);
                self.next_round(ctx);
            }
            Ending::Explosion(mut boom) => {
                boom.update(ctx.grid, now);
                self.ending = Some(Ending::Explosion(boom));
            }
            Ending::Wipe(mut transition) => {
                transition.update(ctx.grid, now);
                self.ending = Some(Ending::Wipe(transition));
            }
        }
    }

    /// Restart with the lives left, or stop when there are none
    fn next_round(&mut self, ctx: &mut BrainContext<'_>) {
        if self.health > 0 {
            self.restart(ctx);
        } else {
            log::info!("Shoot bricks over with {} points", self.points);
            self.stop(ctx);
        }
    }

    fn move_player(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let steps = self.move_timer.poll(now) as i32;
        let Some(player) = self.player.as_mut().filter(|_| steps > 0) else {
            return;
        };

        let left = ctx.keyboard.is_down(Some(Key::ArrowLeft))
            || ctx.gamepads.is_button_down(Button::DPadLeft, None)
            || ctx.gamepads.is_stick_negative(StickAxis::LeftStickX, None);
        let right = ctx.keyboard.is_down(Some(Key::ArrowRight))
            || ctx.gamepads.is_button_down(Button::DPadRight, None)
            || ctx.gamepads.is_stick_positive(StickAxis::LeftStickX, None);

        // The ship may hang one column over either edge
        let x = player.x();
        let dx = if left {
            if x - steps >= -1 { -steps } else { -x - 1 }
        } else if right {
            let limit = ctx.grid.width() - 2;
            if x + steps < limit { steps } else { limit - x }
        } else {
            0
        };
        player.move_relative(ctx.grid, dx, 0);
    }

    fn step_bullets(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let steps = self.bullet_timer.poll(now) as i32;
        if steps == 0 {
            return;
        }

        let mut hits = 0;
        for i in (0..self.bullets.len()).rev() {
            let bullet = &self.bullets[i];
            let hit = (0..steps).find_map(|k| {
                self.enemies
                    .iter()
                    .position(|enemy| bullet.is_colliding_box(enemy, IVec2::new(0, -k)))
            });
            if let Some(enemy) = hit {
                self.enemies.remove(enemy).clear(ctx.grid);
                self.bullets.remove(i).clear(ctx.grid);
                hits += 1;
                continue;
            }

            let bullet = &mut self.bullets[i];
            bullet.move_relative(ctx.grid, 0, -steps);
            if bullet.y() < 0 {
                self.bullets.remove(i);
            }
        }

        if hits > 0 {
            let points = self.points + hits * HIT_POINTS;
            self.set_points(ctx, points);
        }
    }

    fn shoot(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let pad = ctx.gamepads.pressing_pad(Button::A, None);
        if !ctx.keyboard.is_down(Some(Key::Space)) && pad.is_none() {
            self.last_shot = None;
            return;
        }
        if self.last_shot.is_some_and(|last| now - last < SHOOT_DELAY) {
            return;
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };

        let bullet = block(ctx.grid, player.x() + 1, player.y() - 1);
        self.bullets.push(bullet);
        self.last_shot = Some(now);
        if let Some(index) = pad {
            ctx.vibrate(index, SHOT_RUMBLE.0, SHOT_RUMBLE.1);
        }
        ctx.play(AudioType::LaserShoot);
    }

    fn step_enemies(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let steps = self.enemy_timer.poll(now) as i32;
        if steps == 0 {
            return;
        }
        let width = ctx.grid.width();
        let height = ctx.grid.height();

        // One new row per step, stacked above the grid so the move below brings them in
        for row in 0..steps.min(height) {
            for x in 0..width {
                if ctx.rng.random_bool(ENEMY_DENSITY) {
                    let enemy = block(ctx.grid, x, -1 - row);
                    self.enemies.push(enemy);
                }
            }
        }

        let mut hits = 0;
        let mut breached = false;
        for i in (0..self.enemies.len()).rev() {
            let enemy = &self.enemies[i];
            let hit = (0..steps).find_map(|s| {
                self.bullets
                    .iter()
                    .position(|bullet| enemy.is_colliding_box(bullet, IVec2::new(0, s)))
            });
            if let Some(bullet) = hit {
                self.bullets.remove(bullet).clear(ctx.grid);
                self.enemies.remove(i).clear(ctx.grid);
                hits += 1;
                continue;
            }

            let enemy = &mut self.enemies[i];
            enemy.move_relative(ctx.grid, 0, steps);
            if enemy.y() >= height - PLAYER_HEIGHT {
                breached = true;
            }
        }

        if hits > 0 {
            let points = self.points + hits * HIT_POINTS;
            self.set_points(ctx, points);
        }
        if breached {
            self.health = self.health.saturating_sub(1);
            self.draw_health(ctx.mini);
            log::debug!("Brick breached, {} lives left", self.health);
            self.explode(ctx);
        }
    }
}

impl Brain for ShootBricks {
    fn id(&self) -> &str {
        ID
    }

    fn state(&self) -> BrainState {
        self.state
    }

    fn score(&self) -> Option<&Score> {
        Some(&self.score)
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.health = MAX_HEALTH;
        self.draw_health(ctx.mini);
        self.set_points(ctx, 0);
        self.restart(ctx);
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if self.state == BrainState::Started
            && (ctx.keyboard.is_down(Some(Key::Space)) || ctx.gamepads.is_button_down(Button::A, None))
        {
            self.state = BrainState::Running;
            self.move_timer.reset(now);
            self.bullet_timer.reset(now);
            self.enemy_timer.reset(now);
            self.last_shot = Some(now);
        }
        if self.state != BrainState::Running {
            return;
        }

        if let Some(ending) = self.ending.take() {
            self.play_ending(ctx, ending, now);
            return;
        }

        self.move_player(ctx, now);
        self.step_bullets(ctx, now);
        self.shoot(ctx, now);
        self.step_enemies(ctx, now);
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.clear_entities(ctx.grid);
        for i in 0..MAX_HEALTH {
            ctx.mini.set_block(i as i32, 0, false);
        }
        self.state = BrainState::Stopped;
    }
}

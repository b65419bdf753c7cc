//! Flappy brick
//!
//! A single block falls under a constant pull and hops up on space (or gamepad A). Pipes
//! with a five-row gap scroll in from the right; flying through one scores a point, touching
//! a pipe or the floor explodes, wipes the screen and starts over.

use glam::IVec2;
use rand::Rng;

use crate::audio::AudioType;
use crate::context::BrainContext;
use crate::pad;
use crate::platform::{Button, Edge, Key, ListenerId};
use crate::sim::animation::{AnimatedFrames, Animation};
use crate::sim::brain::{Brain, BrainState, Score};
use crate::sim::effects::{DEFAULT_WIPE_DELAY, WipeDirection, explosion, place_explosion, wipe};
use crate::sim::entity::{CollisionBox, Entity, Sprite, sprite};
use crate::sim::grid::{GridSurface, Rect};
use crate::sim::loader::MenuArt;
use crate::sim::timer::StepTimer;

pub const ID: &str = "flappy-brick";

const PLAYER_X: i32 = 2;
/// Physics step, one 60 Hz frame
const FRAME_TIME: f64 = 1000.0 / 60.0;
const GRAVITY: f64 = 0.04;
const MAX_VELOCITY: f64 = 0.25;
const JUMP_VELOCITY: f64 = -0.6;

const PIPE_DELAY: f64 = 300.0;
const PIPE_COUNT: i32 = 3;
const PIPE_SPACING: i32 = 7;
const PIPE_WIDTH: i32 = 2;
const PIPE_GAP: i32 = 5;
/// Gaps never start in the top two rows
const MIN_GAP_START: i32 = 2;
const FLOOR_HEIGHT: i32 = 2;

const MAX_DISPLAY_SCORE: u64 = 999_999;
const CRASH_RUMBLE: (f32, f64) = (1.0, 1000.0);

pub fn create() -> Box<dyn Brain> {
    Box::new(FlappyBrick::new())
}

/// A brick bobbing in front of a pipe
pub fn menu_art() -> MenuArt {
    let scene = |brick_y: i32| -> Sprite {
        let pipe = [0, 1, 5, 6]
            .into_iter()
            .flat_map(|y| [IVec2::new(6, y), IVec2::new(7, y)]);
        let floor = (0..crate::consts::GRID_WIDTH).map(|x| IVec2::new(x, 7));
        pipe.chain(floor).chain([IVec2::new(2, brick_y)]).collect()
    };
    MenuArt {
        x: 0,
        y: 6,
        sprite: Vec::new(),
        animation: Animation::Framed {
            frames: vec![scene(3), scene(2), scene(3), scene(4)],
            delay: 400.0,
            looping: true,
        },
        clear_square: Some(Rect::new(0, 6, crate::consts::GRID_WIDTH, 8)),
    }
}

/// Solid columns above and below a gap of [`PIPE_GAP`] rows starting at `gap_start`
fn pipe_sprite(gap_start: i32, height: i32) -> Sprite {
    let solid = (0..gap_start).chain(gap_start + PIPE_GAP..height - FLOOR_HEIGHT);
    solid
        .flat_map(|y| (0..PIPE_WIDTH).map(move |x| IVec2::new(x, y)))
        .collect()
}

fn pipe(grid: &mut dyn GridSurface, x: i32, gap_start: i32) -> Entity {
    let height = grid.height();
    Entity::new(grid, x, 0, pipe_sprite(gap_start, height), None)
}

fn floor(grid: &mut dyn GridSurface) -> Entity {
    let width = grid.width();
    let cells = (0..FLOOR_HEIGHT)
        .flat_map(|y| (0..width).map(move |x| IVec2::new(x, y)))
        .collect();
    let y = grid.height() - FLOOR_HEIGHT;
    Entity::new(grid, 0, y, cells, Some(CollisionBox::sized(width, FLOOR_HEIGHT)))
}

/// The falling brick. Position is tracked in fractional rows and drawn at the floor of it.
#[derive(Debug, Clone)]
struct Player {
    entity: Entity,
    y: f64,
    velocity: f64,
}

impl Player {
    fn new(grid: &mut dyn GridSurface, x: i32, y: i32) -> Self {
        Self {
            entity: Entity::new(grid, x, y, sprite(&[(0, 0)]), Some(CollisionBox::sized(1, 1))),
            y: f64::from(y),
            velocity: 0.0,
        }
    }

    fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity.min(MAX_VELOCITY);
    }

    fn jump(&mut self) {
        self.set_velocity(JUMP_VELOCITY);
    }

    /// Integrate `steps` (possibly fractional) physics frames
    fn fall(&mut self, grid: &mut dyn GridSurface, steps: f64) {
        self.set_velocity(self.velocity + GRAVITY * steps);
        self.y += self.velocity;
        let x = self.entity.x();
        self.entity.move_to(grid, x, self.y.floor() as i32);
    }
}

/// What plays after a crash, in order
#[derive(Debug)]
enum Ending {
    Explosion(AnimatedFrames),
    Wipe(AnimatedFrames),
}

#[derive(Debug, Clone, Copy)]
struct Listeners {
    jump: ListenerId,
    pad_jump: ListenerId,
}

pub struct FlappyBrick {
    state: BrainState,
    score: Score,
    points: u64,
    player: Option<Player>,
    floor: Option<Entity>,
    pipes: Vec<Entity>,
    ending: Option<Ending>,
    player_timer: StepTimer,
    pipe_timer: StepTimer,
    listeners: Option<Listeners>,
}

impl Default for FlappyBrick {
    fn default() -> Self {
        Self::new()
    }
}

impl FlappyBrick {
    pub fn new() -> Self {
        Self {
            state: BrainState::Created,
            score: Score::default(),
            points: 0,
            player: None,
            floor: None,
            pipes: Vec::new(),
            ending: None,
            player_timer: StepTimer::new(FRAME_TIME),
            pipe_timer: StepTimer::new(PIPE_DELAY),
            listeners: None,
        }
    }

    fn set_points(&mut self, ctx: &mut BrainContext<'_>, points: u64) {
        self.points = points;
        self.score.set(pad(points.min(MAX_DISPLAY_SCORE), 3, ' '));
        ctx.submit_score(points);
    }

    fn spawn_pipe(ctx: &mut BrainContext<'_>, x: i32) -> Entity {
        let gap_end = ctx.grid.height() - FLOOR_HEIGHT - PIPE_GAP - 1;
        let gap_start = ctx.rng.random_range(MIN_GAP_START..gap_end);
        pipe(ctx.grid, x, gap_start)
    }

    fn clear_entities(&mut self, grid: &mut dyn GridSurface) {
        if let Some(player) = self.player.take() {
            player.entity.clear(grid);
        }
        if let Some(floor) = self.floor.take() {
            floor.clear(grid);
        }
        for pipe in self.pipes.drain(..) {
            pipe.clear(grid);
        }
        match self.ending.take() {
            Some(Ending::Explosion(frames) | Ending::Wipe(frames)) => frames.clear(grid),
            None => {}
        }
    }

    fn restart(&mut self, ctx: &mut BrainContext<'_>) {
        self.clear_entities(ctx.grid);
        self.set_points(ctx, 0);

        let width = ctx.grid.width();
        let y = ctx.grid.height() / 2 - 3;
        self.player = Some(Player::new(ctx.grid, PLAYER_X, y));
        self.floor = Some(floor(ctx.grid));
        self.pipes = (0..PIPE_COUNT)
            .map(|i| Self::spawn_pipe(ctx, width + i * PIPE_SPACING))
            .collect();
        self.state = BrainState::Started;
    }

    fn crash(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let size = IVec2::new(ctx.grid.width(), ctx.grid.height());
        let at = place_explosion(player.entity.pos() - IVec2::splat(2), size);
        log::debug!("Flappy brick crashed with {} points", self.points);
        self.ending = Some(Ending::Explosion(explosion(ctx.grid, at.x, at.y)));
        ctx.vibrate_all(CRASH_RUMBLE.0, CRASH_RUMBLE.1);
        ctx.play(AudioType::Explosion);
    }

    fn play_ending(&mut self, ctx: &mut BrainContext<'_>, ending: Ending, now: f64) {
        match ending {
            Ending::Explosion(boom) if boom.is_finished() => {
                boom.clear(ctx.grid);
                if ctx.settings.effective_transition() {
                    let transition = wipe(ctx.grid, WipeDirection::BottomToTop, DEFAULT_WIPE_DELAY);
                    self.ending = Some(Ending::Wipe(transition));
                } else {
                    self.restart(ctx);
                }
            }
            Ending::Wipe(transition) if transition.is_finished() => {
                transition.clear(ctx.grid);
                self.restart(ctx);
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

    /// Move the player by the physics frames elapsed. True on a crash.
    fn step_player(&mut self, ctx: &mut BrainContext<'_>, now: f64) -> bool {
        let Some(steps) = self.player_timer.poll_fraction(now) else {
            return false;
        };
        let (Some(player), Some(floor)) = (self.player.as_mut(), self.floor.as_ref()) else {
            return false;
        };
        player.fall(ctx.grid, steps);
        player.entity.is_colliding_box(floor, IVec2::ZERO)
            || self.pipes.iter().any(|p| player.entity.is_colliding(p, IVec2::ZERO))
    }

    /// Scroll the pipes left. True on a crash.
    fn step_pipes(&mut self, ctx: &mut BrainContext<'_>, now: f64) -> bool {
        let steps = self.pipe_timer.poll(now) as i32;
        if steps == 0 {
            return false;
        }
        let Some(player) = self.player.as_ref() else {
            return false;
        };

        let mut passed = 0;
        let mut crashed = false;
        for pipe in &mut self.pipes {
            pipe.move_relative(ctx.grid, -steps, 0);
            if pipe.x() == player.entity.x() - 1 {
                passed += 1;
            } else if pipe.is_colliding(&player.entity, IVec2::ZERO) {
                crashed = true;
                break;
            }
        }

        let gone = self.pipes.iter().filter(|p| p.x() < -PIPE_WIDTH).count();
        self.pipes.retain(|p| p.x() >= -PIPE_WIDTH);
        for _ in 0..gone {
            let x = self
                .pipes
                .last()
                .map_or(ctx.grid.width(), |p| p.x() + PIPE_SPACING);
            let pipe = Self::spawn_pipe(ctx, x);
            self.pipes.push(pipe);
        }

        if passed > 0 {
            let points = self.points + passed;
            self.set_points(ctx, points);
        }
        crashed
    }
}

impl Brain for FlappyBrick {
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
        self.listeners = Some(Listeners {
            jump: ctx.keyboard.on_key_down(Key::Space),
            pad_jump: ctx.gamepads.add_button_listener(Button::A, Edge::Down, None),
        });
        self.restart(ctx);
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if !self.state.is_active() {
            return;
        }

        if let Some(l) = self.listeners {
            let jumps = ctx.keyboard.drain(l.jump) as usize + ctx.gamepads.drain_buttons(l.pad_jump).len();
            if jumps > 0 && self.ending.is_none() {
                if let Some(player) = self.player.as_mut() {
                    player.jump();
                }
            }
        }

        if self.state == BrainState::Started
            && (ctx.keyboard.is_down(Some(Key::Space)) || ctx.gamepads.is_button_down(Button::A, None))
        {
            self.state = BrainState::Running;
            self.player_timer.reset(now);
            self.pipe_timer.reset(now);
        }
        if self.state != BrainState::Running {
            return;
        }

        if let Some(ending) = self.ending.take() {
            self.play_ending(ctx, ending, now);
            return;
        }

        if self.step_player(ctx, now) || self.step_pipes(ctx, now) {
            self.crash(ctx);
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.clear_entities(ctx.grid);
        if let Some(l) = self.listeners.take() {
            ctx.keyboard.remove_listener(l.jump);
            ctx.gamepads.remove_listener(l.pad_jump);
        }
        self.state = BrainState::Stopped;
    }
}

//! Two-player pong on the vertical grid
//!
//! The bottom player uses the arrow keys, the top player A/D; either can also use a paired
//! gamepad. The ball waits at the centre until space (or gamepad A) is held, speeds up on
//! paddle hits and scores for the opposite player when it leaves the grid.

use rand::Rng;

use super::pairing::{GamepadPairing, PlayerId};
use crate::audio::AudioType;
use crate::context::BrainContext;
use crate::pad;
use crate::platform::{Button, Key, ListenerId, ModalId, StickAxis};
use crate::sim::animation::Animation;
use crate::sim::brain::{Brain, BrainState, Score};
use crate::sim::collision::{Axis, Direction, resolve_bounce};
use crate::sim::entity::{CollisionBox, Entity, sprite};
use crate::sim::grid::Rect;
use crate::sim::loader::MenuArt;
use crate::sim::timer::StepTimer;

pub const ID: &str = "pong";

const PLAYER_NONE: PlayerId = 0;
const PLAYER_BOTTOM: PlayerId = 1;
const PLAYER_TOP: PlayerId = 2;
const PAIRING_VERSION: u32 = 1;

const PADDLE_WIDTH: i32 = 2;
const PADDLE_MOVE_DELAY: f64 = 50.0;
const BALL_MOVE_DELAY: f64 = 100.0;
/// Slower serve, the ball starts from the middle of the screen
const BALL_SERVE_DELAY: f64 = BALL_MOVE_DELAY + 50.0;
const SPEED_UP_CHANCE: f64 = 0.2;
const STRAIGHT_CHANCE: f64 = 0.3;

const HIT_RUMBLE: (f32, f64) = (1.0, 120.0);
const PROMPT_RUMBLE: (f32, f64) = (0.5, 500.0);
const PROMPT_PULSE: f64 = 1000.0;

const SERVE_DIRECTIONS: [Direction; 4] = [
    Direction::UpLeft,
    Direction::UpRight,
    Direction::DownLeft,
    Direction::DownRight,
];

pub fn create() -> Box<dyn Brain> {
    Box::new(Pong::new())
}

/// Paddles chasing a ball
pub fn menu_art() -> MenuArt {
    MenuArt {
        x: 0,
        y: 6,
        sprite: Vec::new(),
        animation: Animation::Framed {
            frames: vec![
                sprite(&[(1, 0), (2, 0), (3, 0), (4, 3), (6, 7), (7, 7), (8, 7)]),
                sprite(&[(2, 0), (3, 0), (4, 0), (2, 1), (4, 7), (5, 7), (6, 7)]),
                sprite(&[(2, 0), (3, 0), (4, 0), (0, 3), (2, 7), (3, 7), (4, 7)]),
                sprite(&[(4, 0), (5, 0), (6, 0), (2, 5), (2, 7), (3, 7), (4, 7)]),
            ],
            delay: 720.0,
            looping: true,
        },
        clear_square: Some(Rect::new(0, 6, crate::consts::GRID_WIDTH, 8)),
    }
}

#[derive(Debug, Clone)]
struct Paddle(Entity);

impl Paddle {
    fn new(ctx: &mut BrainContext<'_>, y: i32) -> Self {
        let x = (ctx.grid.width() - PADDLE_WIDTH) / 2;
        Self(Entity::new(
            ctx.grid,
            x,
            y,
            sprite(&[(0, 0), (1, 0)]),
            Some(CollisionBox::sized(PADDLE_WIDTH, 1)),
        ))
    }

    /// Returns how far the paddle actually moved. The paddle keeps clear of column 0.
    fn move_left(&mut self, ctx: &mut BrainContext<'_>, steps: i32) -> i32 {
        let x = self.0.x();
        let dx = if x - steps > 0 { -steps } else { 1 - x };
        self.0.move_relative(ctx.grid, dx, 0);
        dx
    }

    /// Returns how far the paddle actually moved. The paddle keeps clear of the last column.
    fn move_right(&mut self, ctx: &mut BrainContext<'_>, steps: i32) -> i32 {
        let x = self.0.x();
        let width = ctx.grid.width();
        let dx = if x + steps < width - PADDLE_WIDTH {
            steps
        } else {
            width - 1 - PADDLE_WIDTH - x
        };
        self.0.move_relative(ctx.grid, dx, 0);
        dx
    }
}

#[derive(Debug, Clone)]
struct Ball {
    entity: Entity,
    direction: Direction,
}

impl Ball {
    fn serve(ctx: &mut BrainContext<'_>) -> Self {
        let direction = SERVE_DIRECTIONS[ctx.rng.random_range(0..SERVE_DIRECTIONS.len())];
        let x = (ctx.grid.width() - 1) / 2;
        let y = ctx.grid.height() / 2;
        Self {
            entity: Entity::new(ctx.grid, x, y, sprite(&[(0, 0)]), Some(CollisionBox::sized(1, 1))),
            direction,
        }
    }
}

#[derive(Debug, Clone)]
struct Court {
    top: Paddle,
    bottom: Paddle,
    ball: Ball,
}

impl Court {
    fn paddle(&self, player: PlayerId) -> &Paddle {
        if player == PLAYER_TOP { &self.top } else { &self.bottom }
    }

    fn paddle_mut(&mut self, player: PlayerId) -> &mut Paddle {
        if player == PLAYER_TOP { &mut self.top } else { &mut self.bottom }
    }

    fn clear(&self, ctx: &mut BrainContext<'_>) {
        self.top.0.clear(ctx.grid);
        self.bottom.0.clear(ctx.grid);
        self.ball.entity.clear(ctx.grid);
    }
}

/// An open "which player is this pad" question
#[derive(Debug)]
struct PairingPrompt {
    modal: ModalId,
    index: usize,
    gamepad_id: String,
    pulse: StepTimer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Right,
}

pub struct Pong {
    state: BrainState,
    score: Score,
    court: Option<Court>,
    top_score: u32,
    bottom_score: u32,
    paddle_timer: StepTimer,
    ball_timer: StepTimer,
    can_ball_move: bool,
    pending_hit: Option<PlayerId>,
    pairing: Option<GamepadPairing>,
    connected: Option<ListenerId>,
    prompts: Vec<PairingPrompt>,
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl Pong {
    pub fn new() -> Self {
        Self {
            state: BrainState::Created,
            score: Score::default(),
            court: None,
            top_score: 0,
            bottom_score: 0,
            paddle_timer: StepTimer::new(PADDLE_MOVE_DELAY),
            ball_timer: StepTimer::new(BALL_SERVE_DELAY),
            can_ball_move: false,
            pending_hit: None,
            pairing: None,
            connected: None,
            prompts: Vec::new(),
        }
    }

    fn refresh_score(&mut self, ctx: &mut BrainContext<'_>) {
        self.score.set(format!(
            "{}{}",
            pad(self.top_score, 3, '!'),
            pad(self.bottom_score, 3, '!')
        ));
        ctx.submit_score(u64::from(self.top_score.max(self.bottom_score)));
    }

    /// New ball at the centre, waiting for the serve
    fn restart(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(court) = self.court.as_mut() {
            court.ball.entity.clear(ctx.grid);
            court.ball = Ball::serve(ctx);
        }
        self.wait_for_serve();
    }

    fn wait_for_serve(&mut self) {
        self.can_ball_move = false;
        self.ball_timer.set_interval(BALL_SERVE_DELAY);
        self.pending_hit = None;
        self.state = BrainState::Started;
    }

    fn wants_move(&self, ctx: &BrainContext<'_>, player: PlayerId, side: Horizontal) -> bool {
        let key = match (player, side) {
            (PLAYER_TOP, Horizontal::Left) => Key::KeyA,
            (PLAYER_TOP, Horizontal::Right) => Key::KeyD,
            (_, Horizontal::Left) => Key::ArrowLeft,
            (_, Horizontal::Right) => Key::ArrowRight,
        };
        if ctx.keyboard.is_down(Some(key)) {
            return true;
        }

        let Some(index) = self.pairing.as_ref().and_then(|p| p.gamepad_for_player(player)) else {
            return false;
        };
        match side {
            Horizontal::Left => {
                ctx.gamepads.is_button_down(Button::DPadLeft, Some(index))
                    || ctx.gamepads.is_stick_negative(StickAxis::LeftStickX, Some(index))
            }
            Horizontal::Right => {
                ctx.gamepads.is_button_down(Button::DPadRight, Some(index))
                    || ctx.gamepads.is_stick_positive(StickAxis::LeftStickX, Some(index))
            }
        }
    }

    /// Move one paddle. A paddle that sweeps into the ball's next cell carries the ball along.
    fn move_paddle(&mut self, ctx: &mut BrainContext<'_>, player: PlayerId, steps: i32) {
        let left = self.wants_move(ctx, player, Horizontal::Left);
        let right = self.wants_move(ctx, player, Horizontal::Right);
        let Some(court) = self.court.as_mut() else {
            return;
        };

        let future = court.ball.direction.delta();
        let paddle = court.paddle_mut(player);
        let moved = if left {
            paddle.move_left(ctx, steps)
        } else if right {
            paddle.move_right(ctx, steps)
        } else {
            0
        };
        if moved == 0 || !court.ball.entity.is_colliding_box(&court.paddle(player).0, future) {
            return;
        }

        let ball = &mut court.ball;
        let x = ball.entity.x();
        let dx = (x + moved).clamp(0, ctx.grid.width() - 1) - x;
        ball.entity.move_relative(ctx.grid, dx, 0);
        ball.direction = match (player == PLAYER_TOP, moved > 0) {
            (false, true) => Direction::UpRight,
            (false, false) => Direction::UpLeft,
            (true, true) => Direction::DownRight,
            (true, false) => Direction::DownLeft,
        };
        self.pending_hit = Some(player);
    }

    /// Ball speed and angle changes after touching a paddle
    fn on_paddle_hit(&mut self, ctx: &mut BrainContext<'_>, player: PlayerId) {
        if self.ball_timer.interval() != BALL_MOVE_DELAY {
            self.ball_timer.set_interval(BALL_MOVE_DELAY);
        } else if ctx.rng.random_bool(SPEED_UP_CHANCE) {
            self.ball_timer.set_interval(BALL_MOVE_DELAY - 50.0);
        }

        let width = ctx.grid.width();
        if let Some(court) = self.court.as_mut() {
            let ball = &mut court.ball;
            let x = ball.entity.x();
            if x != 0 && x != width - 1 && ctx.rng.random_bool(STRAIGHT_CHANCE) {
                if ball.direction.is_down() {
                    ball.direction = Direction::DownStraight;
                } else if ball.direction.is_up() {
                    ball.direction = Direction::UpStraight;
                }
            }
        }

        if let Some(index) = self.pairing.as_ref().and_then(|p| p.gamepad_for_player(player)) {
            ctx.vibrate(index, HIT_RUMBLE.0, HIT_RUMBLE.1);
        }
        ctx.play(AudioType::Hit);
    }

    /// One ball step. Returns false once a point was scored and the ball reset.
    fn step_ball(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let width = ctx.grid.width();
        let height = ctx.grid.height();
        let Some(court) = self.court.as_mut() else {
            return false;
        };

        let ball = &mut court.ball;
        let x = ball.entity.x();
        let dx = ball.direction.delta().x;
        if (x == 0 && dx < 0) || (x == width - 1 && dx > 0) {
            ball.direction = ball.direction.flip_x();
        }

        let delta = ball.direction.delta();
        let hit = if ball.entity.is_colliding_box(&court.bottom.0, delta) {
            Some(PLAYER_BOTTOM)
        } else if ball.entity.is_colliding_box(&court.top.0, delta) {
            Some(PLAYER_TOP)
        } else {
            None
        };
        if let Some(player) = hit {
            let (top, bottom) = (&court.top.0, &court.bottom.0);
            let bounce = resolve_bounce(ball.direction, Axis::Vertical, |d| {
                ball.entity.is_colliding_box(bottom, d) || ball.entity.is_colliding_box(top, d)
            });
            // Straight hits leave at a random angle
            ball.direction = match bounce.direction {
                Direction::UpStraight if ctx.rng.random_bool(0.5) => Direction::UpLeft,
                Direction::UpStraight => Direction::UpRight,
                Direction::DownStraight if ctx.rng.random_bool(0.5) => Direction::DownLeft,
                Direction::DownStraight => Direction::DownRight,
                other => other,
            };
            self.pending_hit = Some(player);
        }

        if let Some(player) = self.pending_hit.take() {
            self.on_paddle_hit(ctx, player);
        }

        let Some(court) = self.court.as_mut() else {
            return false;
        };
        let delta = court.ball.direction.delta();
        court.ball.entity.move_relative(ctx.grid, delta.x, delta.y);

        let y = court.ball.entity.y();
        let scorer = if y < 0 {
            PLAYER_BOTTOM
        } else if y >= height {
            PLAYER_TOP
        } else {
            return true;
        };

        if scorer == PLAYER_TOP {
            self.top_score += 1;
        } else {
            self.bottom_score += 1;
        }
        log::debug!("Pong point for player {scorer}: {} - {}", self.top_score, self.bottom_score);
        self.restart(ctx);
        self.refresh_score(ctx);
        ctx.play(AudioType::PickupCoin);
        false
    }

    /// Prompt for new pads and apply the answers
    fn handle_pairing(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let (Some(pairing), Some(listener)) = (self.pairing.as_mut(), self.connected) else {
            return;
        };

        for (index, gamepad_id) in ctx.gamepads.drain_connections(listener) {
            if pairing.is_known(index, &gamepad_id, PAIRING_VERSION) {
                continue;
            }
            let modal = ctx.modals.show_modal(
                "Gamepad connected!",
                format!("[{index}] {gamepad_id}\n\nUse it for:"),
                vec!["Player Bottom".into(), "Player Top".into(), "None".into()],
            );
            self.prompts.push(PairingPrompt {
                modal,
                index,
                gamepad_id,
                pulse: StepTimer::starting_at(PROMPT_PULSE, now),
            });
        }

        self.prompts.retain_mut(|prompt| {
            if let Some(action) = ctx.modals.take_response(prompt.modal) {
                let player = match action {
                    0 => PLAYER_BOTTOM,
                    1 => PLAYER_TOP,
                    _ => PLAYER_NONE,
                };
                log::info!("Gamepad {} paired with player {player}", prompt.index);
                pairing.pair_gamepad(prompt.index, &prompt.gamepad_id, player, PAIRING_VERSION);
                return false;
            }
            if !ctx.modals.is_open(prompt.modal) {
                return false;
            }
            // Pulse the pad being asked about so the player knows which one it is
            if prompt.pulse.poll(now) > 0 {
                ctx.vibrate(prompt.index, PROMPT_RUMBLE.0, PROMPT_RUMBLE.1);
            }
            true
        });

        if let Err(e) = pairing.flush(ctx.storage) {
            log::warn!("Failed to save gamepad pairing: {e}");
        }
    }

    fn serve_pressed(ctx: &BrainContext<'_>) -> bool {
        ctx.keyboard.is_down(Some(Key::Space)) || ctx.gamepads.is_button_down(Button::A, None)
    }
}

impl Brain for Pong {
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
        let bottom_row = ctx.grid.height() - 2;
        let top = Paddle::new(ctx, 1);
        let bottom = Paddle::new(ctx, bottom_row);
        let ball = Ball::serve(ctx);
        self.court = Some(Court { top, bottom, ball });

        self.top_score = 0;
        self.bottom_score = 0;
        self.refresh_score(ctx);

        self.pairing = Some(GamepadPairing::load(ctx.storage, ID));
        self.connected = Some(ctx.gamepads.add_connected_listener(true));

        self.wait_for_serve();
        log::info!("Pong started");
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if !self.state.is_active() {
            return;
        }
        self.handle_pairing(ctx, now);

        if self.state == BrainState::Started {
            self.state = BrainState::Running;
            self.paddle_timer.reset(now);
            self.ball_timer.reset(now);
        }

        let steps = self.paddle_timer.poll(now) as i32;
        if steps > 0 {
            self.move_paddle(ctx, PLAYER_BOTTOM, steps);
            self.move_paddle(ctx, PLAYER_TOP, steps);
        }

        let steps = self.ball_timer.poll(now);
        if steps == 0 {
            return;
        }
        if !self.can_ball_move && Self::serve_pressed(ctx) {
            self.can_ball_move = true;
        }
        if self.can_ball_move {
            for _ in 0..steps {
                if !self.step_ball(ctx) {
                    break;
                }
            }
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(court) = self.court.take() {
            court.clear(ctx);
        }
        if let Some(listener) = self.connected.take() {
            ctx.gamepads.remove_listener(listener);
        }
        for prompt in self.prompts.drain(..) {
            ctx.modals.dismiss(prompt.modal);
        }
        if let Some(mut pairing) = self.pairing.take() {
            if let Err(e) = pairing.flush(ctx.storage) {
                log::warn!("Failed to save gamepad pairing: {e}");
            }
        }
        if self.state != BrainState::Stopped {
            log::info!("Pong stopped at {}", self.score.text());
            self.state = BrainState::Stopped;
        }
    }
}

//! Two-lane car dodging
//!
//! The player's car sits near the bottom and hops between the left and right lane while
//! opponent cars and the roadside walls scroll down. Every passed car scores and makes the
//! road a little faster; holding space boosts. A crash plays an explosion and ends the game.

use glam::IVec2;
use rand::Rng;

use crate::audio::AudioType;
use crate::context::BrainContext;
use crate::pad;
use crate::platform::{Button, Edge, Key, ListenerId};
use crate::sim::animation::{AnimatedFrames, Animation};
use crate::sim::brain::{Brain, BrainState, Score};
use crate::sim::effects::explosion;
use crate::sim::entity::{CollisionBox, Entity, Sprite, sprite};
use crate::sim::grid::{GridSurface, Rect};
use crate::sim::loader::MenuArt;
use crate::sim::timer::StepTimer;

pub const ID: &str = "car-racing";

const CAR_WIDTH: i32 = 3;
const CAR_HEIGHT: i32 = 4;
const PLAYER_Y: i32 = 16;
const LEFT_LANE: i32 = 2;
const RIGHT_LANE: i32 = 5;

const MAX_SPEED: u32 = 170;
const BOOST: u32 = 150;
/// Scroll interval at speed 0; each speed point takes a millisecond off
const BASE_DELAY: f64 = 200.0;

const WALLS_PER_SIDE: i32 = 5;
const WALL_SPACING: i32 = 5;
const WALL_WRAP: i32 = WALLS_PER_SIDE * WALL_SPACING;
/// Rows the newest car must travel before the next one spawns
const SPAWN_GAP: i32 = 5;

const CRASH_RUMBLE: (f32, f64) = (1.0, 1000.0);

///   []
/// [][][]
///   []
/// []  []
fn car_sprite() -> Sprite {
    sprite(&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2), (0, 3), (2, 3)])
}

fn wall_sprite() -> Sprite {
    sprite(&[(0, 0), (0, 1), (0, 2)])
}

fn car(grid: &mut dyn GridSurface, x: i32, y: i32) -> Entity {
    Entity::new(grid, x, y, car_sprite(), Some(CollisionBox::sized(CAR_WIDTH, CAR_HEIGHT)))
}

fn wall(grid: &mut dyn GridSurface, x: i32, y: i32) -> Entity {
    Entity::new(grid, x, y, wall_sprite(), None)
}

pub fn create() -> Box<dyn Brain> {
    Box::new(CarRacing::new())
}

/// Two cars on a scrolling road
pub fn menu_art() -> MenuArt {
    let frame = |scroll: i32| -> Sprite {
        let walls = (0..8)
            .filter(|y| (y + scroll) % 4 != 3)
            .flat_map(|y| [IVec2::new(0, y), IVec2::new(9, y)]);
        let opponent = car_sprite().into_iter().map(|c| c + IVec2::new(RIGHT_LANE, scroll));
        let player = car_sprite().into_iter().map(|c| c + IVec2::new(LEFT_LANE, 4));
        walls.chain(opponent).chain(player).collect()
    };
    MenuArt {
        x: 0,
        y: 6,
        sprite: Vec::new(),
        animation: Animation::Framed {
            frames: (0..4).map(frame).collect(),
            delay: 360.0,
            looping: true,
        },
        clear_square: Some(Rect::new(0, 6, crate::consts::GRID_WIDTH, 8)),
    }
}

#[derive(Debug, Clone)]
struct Track {
    player: Entity,
    walls: Vec<Entity>,
    /// Oldest first, the newest car is last
    cars: Vec<Entity>,
}

impl Track {
    fn clear(&self, grid: &mut dyn GridSurface) {
        self.player.clear(grid);
        for entity in self.walls.iter().chain(&self.cars) {
            entity.clear(grid);
        }
    }

    /// Top-left of the explosion for a crash with any car
    fn crash_site(&self) -> Option<IVec2> {
        self.cars
            .iter()
            .find(|car| car.is_colliding_box(&self.player, IVec2::ZERO))
            .map(|car| car.pos() - IVec2::Y)
    }
}

#[derive(Debug, Clone, Copy)]
struct Listeners {
    left: ListenerId,
    right: ListenerId,
    pad_left: ListenerId,
    pad_right: ListenerId,
}

pub struct CarRacing {
    state: BrainState,
    score: Score,
    points: u64,
    speed: u32,
    track: Option<Track>,
    explosion: Option<AnimatedFrames>,
    timer: StepTimer,
    listeners: Option<Listeners>,
}

impl Default for CarRacing {
    fn default() -> Self {
        Self::new()
    }
}

impl CarRacing {
    pub fn new() -> Self {
        Self {
            state: BrainState::Created,
            score: Score::default(),
            points: 0,
            speed: 0,
            track: None,
            explosion: None,
            timer: StepTimer::new(BASE_DELAY),
            listeners: None,
        }
    }

    fn random_lane(ctx: &mut BrainContext<'_>) -> i32 {
        if ctx.rng.random_bool(0.5) { LEFT_LANE } else { RIGHT_LANE }
    }

    fn spawn_car(ctx: &mut BrainContext<'_>) -> Entity {
        let x = Self::random_lane(ctx);
        car(ctx.grid, x, -CAR_HEIGHT)
    }

    fn set_points(&mut self, ctx: &mut BrainContext<'_>, points: u64) {
        self.points = points;
        self.score.set(pad(points, 3, ' '));
        ctx.submit_score(points);
    }

    /// Speed for this step, with the space boost applied
    fn actual_speed(&self, ctx: &BrainContext<'_>) -> u32 {
        if ctx.keyboard.is_down(Some(Key::Space)) || ctx.gamepads.is_button_down(Button::A, None) {
            (self.speed + BOOST).min(MAX_SPEED)
        } else {
            self.speed
        }
    }

    fn explode(&mut self, ctx: &mut BrainContext<'_>, at: IVec2) {
        log::debug!("Car crash at {at}");
        self.explosion = Some(explosion(ctx.grid, at.x, at.y));
        ctx.play(AudioType::Explosion);
        ctx.vibrate_all(CRASH_RUMBLE.0, CRASH_RUMBLE.1);
    }

    fn switch_lane(&mut self, ctx: &mut BrainContext<'_>, lane: i32) {
        if self.explosion.is_some() {
            return;
        }
        let Some(track) = self.track.as_mut() else {
            return;
        };
        track.player.move_to(ctx.grid, lane, PLAYER_Y);
        if let Some(at) = track.crash_site() {
            self.explode(ctx, at);
        }
    }

    fn handle_lane_input(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(l) = self.listeners else {
            return;
        };
        let left = ctx.keyboard.drain(l.left) as usize + ctx.gamepads.drain_buttons(l.pad_left).len();
        let right = ctx.keyboard.drain(l.right) as usize + ctx.gamepads.drain_buttons(l.pad_right).len();
        if left > 0 {
            self.switch_lane(ctx, LEFT_LANE);
        }
        if right > 0 {
            self.switch_lane(ctx, RIGHT_LANE);
        }
    }

    /// Scroll walls and cars `steps` rows
    fn advance(&mut self, ctx: &mut BrainContext<'_>, steps: i32, actual_speed: u32) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        let height = ctx.grid.height();

        for wall in &mut track.walls {
            wall.move_relative(ctx.grid, 0, steps);
            if wall.y() >= height {
                wall.move_relative(ctx.grid, 0, -WALL_WRAP);
            }
        }

        let mut crash = None;
        let mut passed = 0;
        for i in (0..track.cars.len()).rev() {
            let car = &mut track.cars[i];
            car.move_relative(ctx.grid, 0, steps);
            if car.y() >= height {
                track.cars.remove(i);
            } else if car.is_colliding_box(&track.player, IVec2::ZERO) {
                crash = Some(car.pos() - IVec2::Y);
            } else if car.y() == PLAYER_Y + 1 {
                passed += 1;
            }
        }

        if track.cars.last().is_none_or(|c| c.y() >= SPAWN_GAP) {
            let car = Self::spawn_car(ctx);
            track.cars.push(car);
        }

        for _ in 0..passed {
            let points = self.points + 100 + u64::from(actual_speed);
            self.set_points(ctx, points);
            if self.speed < MAX_SPEED {
                self.speed += 1;
            }
        }
        if let Some(at) = crash {
            self.explode(ctx, at);
        }
    }
}

impl Brain for CarRacing {
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
        let right_wall = ctx.grid.width() - 1;
        let mut walls = Vec::new();
        for i in 0..WALLS_PER_SIDE {
            let y = -i * WALL_SPACING - 3;
            walls.push(wall(ctx.grid, 0, y));
            walls.push(wall(ctx.grid, right_wall, y));
        }
        let first = Self::spawn_car(ctx);
        self.track = Some(Track {
            player: car(ctx.grid, LEFT_LANE, PLAYER_Y),
            walls,
            cars: vec![first],
        });

        self.listeners = Some(Listeners {
            left: ctx.keyboard.on_key_down(Key::ArrowLeft),
            right: ctx.keyboard.on_key_down(Key::ArrowRight),
            pad_left: ctx.gamepads.add_button_listener(Button::DPadLeft, Edge::Down, None),
            pad_right: ctx.gamepads.add_button_listener(Button::DPadRight, Edge::Down, None),
        });

        self.speed = 0;
        self.set_points(ctx, 0);
        self.state = BrainState::Started;
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if !self.state.is_active() {
            return;
        }
        self.handle_lane_input(ctx);

        if self.state == BrainState::Started
            && (ctx.keyboard.is_down(None) || ctx.gamepads.is_button_down(Button::A, None))
        {
            self.state = BrainState::Running;
            self.timer.reset(now);
        }
        if self.state != BrainState::Running {
            return;
        }

        if let Some(boom) = self.explosion.as_mut() {
            if boom.is_finished() {
                log::info!("Car racing over with {} points", self.points);
                self.stop(ctx);
            } else {
                boom.update(ctx.grid, now);
            }
            return;
        }

        let actual_speed = self.actual_speed(ctx);
        self.timer.set_interval(BASE_DELAY - f64::from(actual_speed));
        let steps = self.timer.poll(now);
        if steps > 0 {
            self.advance(ctx, steps as i32, actual_speed);
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(track) = self.track.take() {
            track.clear(ctx.grid);
        }
        if let Some(boom) = self.explosion.take() {
            boom.clear(ctx.grid);
        }
        if let Some(l) = self.listeners.take() {
            ctx.keyboard.remove_listener(l.left);
            ctx.keyboard.remove_listener(l.right);
            ctx.gamepads.remove_listener(l.pad_left);
            ctx.gamepads.remove_listener(l.pad_right);
        }
        self.state = BrainState::Stopped;
    }
}

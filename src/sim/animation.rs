//! Time-driven sprite animation
//!
//! State machine: `Idle --first update--> Playing --frames exhausted--> Finished`.
//! Looping animations wrap their frame index and never finish. A finished animation keeps
//! its last frame on the grid; the owner clears it.

use thiserror::Error;

use super::entity::{Entity, Sprite};
use super::grid::{GridSurface, Rect};
use super::timer::StepTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Playing,
    Finished,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimationError {
    #[error("animation needs at least one frame")]
    EmptyFrames,
}

/// What a [`FrameClock`] tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// First update: the clock just started playing
    Started,
    /// This many whole steps elapsed
    Steps(u32),
    /// Nothing to do this frame
    Wait,
}

/// [`StepTimer`] plus the idle/playing/finished transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    state: AnimationState,
    timer: StepTimer,
}

impl FrameClock {
    pub fn new(delay: f64) -> Self {
        Self {
            state: AnimationState::Idle,
            timer: StepTimer::new(delay),
        }
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    #[inline]
    pub fn delay(&self) -> f64 {
        self.timer.interval()
    }

    pub fn tick(&mut self, now: f64) -> Tick {
        match self.state {
            AnimationState::Idle => {
                self.state = AnimationState::Playing;
                self.timer.reset(now);
                Tick::Started
            }
            AnimationState::Playing => match self.timer.poll(now) {
                0 => Tick::Wait,
                steps => Tick::Steps(steps),
            },
            AnimationState::Finished => Tick::Wait,
        }
    }

    pub fn finish(&mut self) {
        self.state = AnimationState::Finished;
    }
}

/// An entity cycling through a fixed list of frames
#[derive(Debug, Clone)]
pub struct AnimatedFrames {
    entity: Entity,
    frames: Vec<Sprite>,
    index: usize,
    looping: bool,
    clear_square: Option<Rect>,
    clock: FrameClock,
}

impl AnimatedFrames {
    /// One-shot animation. The first frame is drawn immediately.
    pub fn try_new(
        grid: &mut dyn GridSurface,
        x: i32,
        y: i32,
        frames: Vec<Sprite>,
        delay: f64,
    ) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::EmptyFrames);
        }
        Ok(Self::from_frames(grid, x, y, frames, delay))
    }

    /// Constructor for built-in frame tables, which are never empty
    pub(crate) fn from_frames(
        grid: &mut dyn GridSurface,
        x: i32,
        y: i32,
        frames: Vec<Sprite>,
        delay: f64,
    ) -> Self {
        let first = frames.first().cloned().unwrap_or_default();
        Self {
            entity: Entity::new(grid, x, y, first, None),
            frames,
            index: 0,
            looping: false,
            clear_square: None,
            clock: FrameClock::new(delay),
        }
    }

    /// Cycle forever instead of finishing
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Region to blank once when playback starts
    pub fn with_clear_square(mut self, rect: Rect) -> Self {
        self.clear_square = Some(rect);
        self
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.clock.state()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.clock.state() == AnimationState::Finished
    }

    /// Index of the frame currently shown
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn update(&mut self, grid: &mut dyn GridSurface, now: f64) {
        match self.clock.tick(now) {
            Tick::Started => {
                if let Some(square) = self.clear_square {
                    grid.clear_rect(square);
                    self.entity.draw(grid);
                }
            }
            Tick::Steps(steps) => self.advance(grid, steps as usize),
            Tick::Wait => {}
        }
    }

    fn advance(&mut self, grid: &mut dyn GridSurface, steps: usize) {
        let count = self.frames.len();
        if self.looping {
            self.index = (self.index + steps) % count;
        } else if self.index + steps >= count {
            // Overshoot clamps to the last frame, which is already drawn
            self.index = count - 1;
            self.clock.finish();
            return;
        } else {
            self.index += steps;
        }
        let frame = self.frames[self.index].clone();
        self.entity.update_sprite(grid, frame);
    }

    /// Unlight the current frame
    pub fn clear(&self, grid: &mut dyn GridSurface) {
        self.entity.clear(grid);
    }
}

/// Animation attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    Static,
    Framed {
        frames: Vec<Sprite>,
        delay: f64,
        looping: bool,
    },
}

/// A drawn entity together with its animation driver
#[derive(Debug, Clone)]
pub enum Animator {
    Static(Entity),
    Framed(AnimatedFrames),
}

impl Animator {
    /// Draw `sprite` (static) or the first of `frames` (framed) at (x, y)
    pub fn build(
        grid: &mut dyn GridSurface,
        x: i32,
        y: i32,
        sprite: Sprite,
        animation: Animation,
        clear_square: Option<Rect>,
    ) -> Result<Self, AnimationError> {
        Ok(match animation {
            Animation::Static => {
                if let Some(square) = clear_square {
                    grid.clear_rect(square);
                }
                Animator::Static(Entity::new(grid, x, y, sprite, None))
            }
            Animation::Framed {
                frames,
                delay,
                looping,
            } => {
                let mut frames = AnimatedFrames::try_new(grid, x, y, frames, delay)?.looping(looping);
                if let Some(square) = clear_square {
                    frames = frames.with_clear_square(square);
                }
                Animator::Framed(frames)
            }
        })
    }

    pub fn update(&mut self, grid: &mut dyn GridSurface, now: f64) {
        if let Animator::Framed(frames) = self {
            frames.update(grid, now);
        }
    }

    /// Static entities have nothing left to play
    pub fn state(&self) -> AnimationState {
        match self {
            Animator::Static(_) => AnimationState::Finished,
            Animator::Framed(frames) => frames.state(),
        }
    }

    pub fn entity(&self) -> &Entity {
        match self {
            Animator::Static(entity) => entity,
            Animator::Framed(frames) => frames.entity(),
        }
    }

    pub fn clear(&self, grid: &mut dyn GridSurface) {
        self.entity().clear(grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::sprite;
    use crate::sim::grid::BlockGrid;
    use glam::IVec2;

    fn three_frames() -> Vec<Sprite> {
        vec![sprite(&[(0, 0)]), sprite(&[(1, 0)]), sprite(&[(2, 0)])]
    }

    #[test]
    fn test_empty_frames_rejected() {
        let mut grid = BlockGrid::new(10, 20);
        let err = AnimatedFrames::try_new(&mut grid, 0, 0, Vec::new(), 100.0).unwrap_err();
        assert_eq!(err, AnimationError::EmptyFrames);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_one_shot_steps_and_finishes() {
        let mut grid = BlockGrid::new(10, 20);
        let mut anim = AnimatedFrames::try_new(&mut grid, 0, 0, three_frames(), 100.0).unwrap();
        assert_eq!(anim.state(), AnimationState::Idle);
        assert!(grid.is_lit(0, 0));

        anim.update(&mut grid, 0.0);
        assert_eq!(anim.state(), AnimationState::Playing);
        assert_eq!(anim.index(), 0);

        anim.update(&mut grid, 250.0);
        assert_eq!(anim.index(), 2);
        assert_eq!(anim.state(), AnimationState::Playing);
        assert!(grid.is_lit(2, 0));
        assert!(!grid.is_lit(0, 0));

        // Not yet a full step since t=250
        anim.update(&mut grid, 340.0);
        assert_eq!(anim.state(), AnimationState::Playing);

        anim.update(&mut grid, 350.0);
        assert_eq!(anim.state(), AnimationState::Finished);
        assert_eq!(anim.index(), 2);
        // Last frame stays until the owner clears it
        assert!(grid.is_lit(2, 0));
        anim.clear(&mut grid);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_overshoot_clamps_and_finishes() {
        let mut grid = BlockGrid::new(10, 20);
        let mut anim = AnimatedFrames::try_new(&mut grid, 0, 0, three_frames(), 100.0).unwrap();
        anim.update(&mut grid, 0.0);
        anim.update(&mut grid, 1000.0);
        assert!(anim.is_finished());
        assert_eq!(anim.index(), 2);
    }

    #[test]
    fn test_looping_wraps() {
        let mut grid = BlockGrid::new(10, 20);
        let mut anim = AnimatedFrames::try_new(&mut grid, 0, 0, three_frames(), 100.0)
            .unwrap()
            .looping(true);
        anim.update(&mut grid, 0.0);
        anim.update(&mut grid, 250.0);
        assert_eq!(anim.index(), 2);
        assert_eq!(anim.state(), AnimationState::Playing);

        anim.update(&mut grid, 450.0);
        assert_eq!(anim.index(), 1);
        assert_eq!(anim.state(), AnimationState::Playing);
        assert_eq!(grid.lit_cells(), vec![IVec2::new(1, 0)]);
    }

    #[test]
    fn test_clear_square_blanks_once_on_start() {
        let mut grid = BlockGrid::new(10, 20);
        for cell in Rect::new(0, 0, 5, 5).cells() {
            grid.set_block(cell.x, cell.y, true);
        }
        let mut anim = AnimatedFrames::try_new(&mut grid, 0, 0, three_frames(), 100.0)
            .unwrap()
            .with_clear_square(Rect::new(0, 0, 5, 5));

        anim.update(&mut grid, 0.0);
        assert_eq!(grid.lit_cells(), vec![IVec2::new(0, 0)]);

        // Blocks lit by others afterwards survive
        grid.set_block(4, 4, true);
        anim.update(&mut grid, 100.0);
        assert!(grid.is_lit(4, 4));
    }

    #[test]
    fn test_animator_variants() {
        let mut grid = BlockGrid::new(10, 20);
        let still = Animator::build(&mut grid, 1, 1, sprite(&[(0, 0)]), Animation::Static, None).unwrap();
        assert_eq!(still.state(), AnimationState::Finished);
        assert!(grid.is_lit(1, 1));

        let mut framed = Animator::build(
            &mut grid,
            5,
            5,
            Vec::new(),
            Animation::Framed {
                frames: three_frames(),
                delay: 50.0,
                looping: true,
            },
            None,
        )
        .unwrap();
        framed.update(&mut grid, 0.0);
        framed.update(&mut grid, 50.0);
        assert_eq!(framed.state(), AnimationState::Playing);
        assert!(grid.is_lit(6, 5));

        let empty = Animator::build(
            &mut grid,
            0,
            0,
            Vec::new(),
            Animation::Framed {
                frames: Vec::new(),
                delay: 50.0,
                looping: false,
            },
            None,
        );
        assert!(matches!(empty, Err(AnimationError::EmptyFrames)));
    }
}

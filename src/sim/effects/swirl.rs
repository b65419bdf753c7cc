//! Inward spiral that lights the grid ring by ring, starting bottom-left

use crate::sim::animation::{AnimationState, FrameClock, Tick};
use crate::sim::grid::GridSurface;

pub const SWIRL_DELAY: f64 = 13.8;

/// A walker that lights one block per step. It only ever turns blocks on.
#[derive(Debug, Clone)]
pub struct SwirlEffect {
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    layer: i32,
    clock: FrameClock,
}

impl SwirlEffect {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_delay(width, height, SWIRL_DELAY)
    }

    pub fn with_delay(width: i32, height: i32, delay: f64) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: height - 1,
            layer: 0,
            clock: FrameClock::new(delay),
        }
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.clock.state()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.clock.state() == AnimationState::Finished
    }

    /// Ring the walker is on (0 is the outer border)
    #[inline]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    fn innermost_layer(&self) -> i32 {
        self.width.min(self.height) / 2
    }

    pub fn update(&mut self, grid: &mut dyn GridSurface, now: f64) {
        if let Tick::Steps(steps) = self.clock.tick(now) {
            for _ in 0..steps {
                if self.step(grid) {
                    self.clock.finish();
                    break;
                }
            }
        }
    }

    /// Light the current block and walk on. True once the innermost ring is reached.
    fn step(&mut self, grid: &mut dyn GridSurface) -> bool {
        grid.set_block(self.x, self.y, true);
        if self.layer >= self.innermost_layer() {
            return true;
        }

        let (w, h, l) = (self.width, self.height, self.layer);
        if self.x < w - 1 - l && self.y == h - 1 - l {
            self.x += 1;
        } else if self.x == w - 1 - l && self.y > l {
            self.y -= 1;
        } else if self.x > l && self.y == l {
            self.x -= 1;
        } else if self.x == l && self.y < h - 1 - l {
            self.y += 1;
        }

        if self.x == l && self.y == h - 2 - l {
            self.layer += 1;
        }
        false
    }
}

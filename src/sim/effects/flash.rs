//! Blink a fixed set of blocks on and off

use crate::sim::animation::{AnimationState, FrameClock, Tick};
use crate::sim::entity::{Entity, Sprite};
use crate::sim::grid::GridSurface;

/// Toggles `sprite` a fixed number of times, one toggle per elapsed delay.
/// Late frames do not catch up: each update toggles at most once.
#[derive(Debug, Clone)]
pub struct FlashEffect {
    entity: Entity,
    sprite: Sprite,
    remaining: u32,
    on: bool,
    clock: FrameClock,
}

impl FlashEffect {
    /// Starts lit when `initially_on`, otherwise the sprite blocks are unlit first
    pub fn new(
        grid: &mut dyn GridSurface,
        sprite: Sprite,
        delay: f64,
        times: u32,
        initially_on: bool,
    ) -> Self {
        let mut entity = Entity::new(grid, 0, 0, sprite.clone(), None);
        if !initially_on {
            entity.update_sprite(grid, Vec::new());
        }
        let mut clock = FrameClock::new(delay);
        if times == 0 {
            clock.finish();
        }
        Self {
            entity,
            sprite,
            remaining: times,
            on: initially_on,
            clock,
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

    /// Whether the sprite is currently lit
    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn update(&mut self, grid: &mut dyn GridSurface, now: f64) {
        if let Tick::Steps(_) = self.clock.tick(now) {
            let next = if self.on { Vec::new() } else { self.sprite.clone() };
            self.entity.update_sprite(grid, next);
            self.on = !self.on;

            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.clock.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::sprite;
    use crate::sim::grid::BlockGrid;

    #[test]
    fn test_toggles_n_times_and_finishes() {
        let mut grid = BlockGrid::new(10, 20);
        let mut flash = FlashEffect::new(&mut grid, sprite(&[(1, 1), (2, 1)]), 439.0, 3, true);
        assert_eq!(grid.lit_count(), 2);

        flash.update(&mut grid, 0.0);
        assert_eq!(flash.state(), AnimationState::Playing);
        assert_eq!(grid.lit_count(), 2);

        flash.update(&mut grid, 439.0);
        assert!(!flash.is_on());
        assert_eq!(grid.lit_count(), 0);

        // A long gap still only toggles once
        flash.update(&mut grid, 2000.0);
        assert!(flash.is_on());
        assert_eq!(grid.lit_count(), 2);
        assert!(!flash.is_finished());

        flash.update(&mut grid, 2439.0);
        assert!(flash.is_finished());
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_starting_off_unlights_sprite() {
        let mut grid = BlockGrid::new(10, 20);
        grid.set_block(1, 1, true);
        grid.set_block(5, 5, true);
        let mut flash = FlashEffect::new(&mut grid, sprite(&[(1, 1)]), 100.0, 1, false);
        assert!(!grid.is_lit(1, 1));
        assert!(grid.is_lit(5, 5));

        flash.update(&mut grid, 0.0);
        flash.update(&mut grid, 100.0);
        assert!(grid.is_lit(1, 1));
        assert!(flash.is_finished());
    }
}

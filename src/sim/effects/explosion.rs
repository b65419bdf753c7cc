//! Expanding/contracting diamond explosion

use glam::IVec2;

use crate::sim::animation::AnimatedFrames;
use crate::sim::entity::{Sprite, sprite};
use crate::sim::grid::{GridSurface, Rect};

pub const EXPLOSION_DELAY: f64 = 100.0;
/// Side of the square the explosion covers
pub const EXPLOSION_SIZE: i32 = 5;
const CYCLES: usize = 4;

/// Six-frame burst repeated four times
pub fn explosion_frames() -> Vec<Sprite> {
    let dot = sprite(&[(2, 2)]);
    let ring = sprite(&[(1, 1), (2, 1), (3, 1), (1, 2), (3, 2), (1, 3), (2, 3), (3, 3)]);
    let outer = sprite(&[(0, 0), (2, 0), (4, 0), (0, 2), (4, 2), (0, 4), (2, 4), (4, 4)]);
    let diamond = sprite(&[(1, 0), (3, 0), (0, 1), (4, 1), (0, 3), (4, 3), (1, 4), (3, 4)]);

    let cycle = [dot, ring.clone(), outer.clone(), diamond, outer, ring];
    (0..CYCLES).flat_map(|_| cycle.iter().cloned()).collect()
}

/// Explosion with its top-left corner at (x, y). Blanks its 5x5 square when it starts.
pub fn explosion(grid: &mut dyn GridSurface, x: i32, y: i32) -> AnimatedFrames {
    AnimatedFrames::from_frames(grid, x, y, explosion_frames(), EXPLOSION_DELAY)
        .with_clear_square(Rect::new(x, y, EXPLOSION_SIZE, EXPLOSION_SIZE))
}

/// Shift a top-left corner so the whole explosion square fits on a grid of `size`
pub fn place_explosion(corner: IVec2, size: IVec2) -> IVec2 {
    let fit = |v: i32, extent: i32| v + 0.min(extent - (v + EXPLOSION_SIZE)) + 0.max(-v);
    IVec2::new(fit(corner.x, size.x), fit(corner.y, size.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::animation::AnimationState;
    use crate::sim::grid::BlockGrid;

    #[test]
    fn test_frame_table() {
        let frames = explosion_frames();
        assert_eq!(frames.len(), 24);
        assert_eq!(frames[0], frames[6]);
        assert_eq!(frames[2], frames[4]);
        assert_eq!(frames[1], frames[5]);
        assert!(frames.iter().flatten().all(|c| c.x >= 0 && c.x < 5 && c.y >= 0 && c.y < 5));
    }

    #[test]
    fn test_explosion_runs_to_completion() {
        let mut grid = BlockGrid::new(10, 20);
        grid.set_block(0, 0, true);
        let mut boom = explosion(&mut grid, 0, 0);

        boom.update(&mut grid, 0.0);
        assert!(!grid.is_lit(0, 0));
        assert!(grid.is_lit(2, 2));

        boom.update(&mut grid, 2300.0);
        assert_eq!(boom.index(), 23);
        assert_eq!(boom.state(), AnimationState::Playing);

        boom.update(&mut grid, 2400.0);
        assert!(boom.is_finished());
        boom.clear(&mut grid);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_place_explosion_clamps_to_grid() {
        let size = IVec2::new(10, 20);
        assert_eq!(place_explosion(IVec2::new(-2, -1), size), IVec2::new(0, 0));
        assert_eq!(place_explosion(IVec2::new(8, 18), size), IVec2::new(5, 15));
        assert_eq!(place_explosion(IVec2::new(3, 7), size), IVec2::new(3, 7));
    }
}

//! Full-screen wipe transitions
//!
//! The wipe fills the grid row by row, then empties it in the same direction.

use glam::IVec2;

use crate::sim::animation::AnimatedFrames;
use crate::sim::entity::Sprite;
use crate::sim::grid::GridSurface;

pub const DEFAULT_WIPE_DELAY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeDirection {
    BottomToTop,
    TopToBottom,
}

impl WipeDirection {
    /// Grid row for the `i`th row swept
    fn row(self, i: i32, height: i32) -> i32 {
        match self {
            WipeDirection::BottomToTop => height - i - 1,
            WipeDirection::TopToBottom => i,
        }
    }
}

fn rows(direction: WipeDirection, width: i32, height: i32, swept: impl Iterator<Item = i32>) -> Sprite {
    swept
        .flat_map(|i| {
            let y = direction.row(i, height);
            (0..width).map(move |x| IVec2::new(x, y))
        })
        .collect()
}

/// Sweep in (`height - 1` frames, growing) then sweep out (`height` frames, shrinking)
pub fn wipe_frames(width: i32, height: i32, direction: WipeDirection) -> Vec<Sprite> {
    let sweep_in = (0..height - 1).map(|row| rows(direction, width, height, 0..=row));
    let sweep_out = (0..height).map(|row| rows(direction, width, height, (0..height - row).rev()));
    sweep_in.chain(sweep_out).collect()
}

/// Wipe over the whole grid, anchored at the origin
pub fn wipe(grid: &mut dyn GridSurface, direction: WipeDirection, delay: f64) -> AnimatedFrames {
    let frames = wipe_frames(grid.width(), grid.height(), direction);
    AnimatedFrames::from_frames(grid, 0, 0, frames, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::BlockGrid;

    #[test]
    fn test_frame_counts_and_shapes() {
        let frames = wipe_frames(10, 20, WipeDirection::BottomToTop);
        assert_eq!(frames.len(), 39);
        assert_eq!(frames[0].len(), 10);
        assert!(frames[0].iter().all(|c| c.y == 19));
        // Fully covered minus the top row at the end of the sweep in
        assert_eq!(frames[18].len(), 190);
        // Sweep out starts full and ends with a single row
        assert_eq!(frames[19].len(), 200);
        assert_eq!(frames[38].len(), 10);
        assert!(frames[38].iter().all(|c| c.y == 19));
    }

    #[test]
    fn test_top_to_bottom_mirrors() {
        let frames = wipe_frames(4, 4, WipeDirection::TopToBottom);
        assert!(frames[0].iter().all(|c| c.y == 0));
        assert_eq!(frames.len(), 7);
    }

    #[test]
    fn test_wipe_plays_over_grid() {
        let mut grid = BlockGrid::new(4, 4);
        let mut transition = wipe(&mut grid, WipeDirection::BottomToTop, DEFAULT_WIPE_DELAY);
        assert_eq!(grid.lit_count(), 4);

        transition.update(&mut grid, 0.0);
        transition.update(&mut grid, 30.0);
        assert_eq!(grid.lit_count(), 16);

        transition.update(&mut grid, 1000.0);
        assert!(transition.is_finished());
        transition.clear(&mut grid);
        assert_eq!(grid.lit_count(), 0);
    }
}

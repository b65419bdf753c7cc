//! Collision detection and response on the block grid
//!
//! Two tests are available: pixel-exact sprite overlap and strict AABB overlap.
//! Both are pure queries; callers pass a positional offset to probe where an entity
//! *would* be before committing a move, then pick a direction that keeps it clear.

use std::collections::HashSet;

use glam::IVec2;

use super::grid::Rect;

/// True if any cell of `a` is also a cell of `b`
pub fn sprites_overlap(
    mut a: impl Iterator<Item = IVec2>,
    b: impl Iterator<Item = IVec2>,
) -> bool {
    let b: HashSet<IVec2> = b.collect();
    if b.is_empty() {
        return false;
    }
    a.any(|cell| b.contains(&cell))
}

/// Strict rectangle overlap. Touching edges do not collide.
#[inline]
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    a.overlaps(&b)
}

/// One-cell-per-step movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    UpStraight,
    DownStraight,
    LeftStraight,
    RightStraight,
    Still,
}

impl Direction {
    /// Grid delta for one step (y grows downwards)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::UpLeft => IVec2::new(-1, -1),
            Direction::UpRight => IVec2::new(1, -1),
            Direction::DownLeft => IVec2::new(-1, 1),
            Direction::DownRight => IVec2::new(1, 1),
            Direction::UpStraight => IVec2::new(0, -1),
            Direction::DownStraight => IVec2::new(0, 1),
            Direction::LeftStraight => IVec2::new(-1, 0),
            Direction::RightStraight => IVec2::new(1, 0),
            Direction::Still => IVec2::ZERO,
        }
    }

    /// Direction whose delta has the same signs as `delta`
    pub fn from_delta(delta: IVec2) -> Self {
        match (delta.x.signum(), delta.y.signum()) {
            (-1, -1) => Direction::UpLeft,
            (1, -1) => Direction::UpRight,
            (-1, 1) => Direction::DownLeft,
            (1, 1) => Direction::DownRight,
            (0, -1) => Direction::UpStraight,
            (0, 1) => Direction::DownStraight,
            (-1, 0) => Direction::LeftStraight,
            (1, 0) => Direction::RightStraight,
            _ => Direction::Still,
        }
    }

    /// Mirror the horizontal component (bounce off a vertical surface)
    pub fn flip_x(self) -> Self {
        let d = self.delta();
        Self::from_delta(IVec2::new(-d.x, d.y))
    }

    /// Mirror the vertical component (bounce off a horizontal surface)
    pub fn flip_y(self) -> Self {
        let d = self.delta();
        Self::from_delta(IVec2::new(d.x, -d.y))
    }

    /// Opposite direction
    pub fn reverse(self) -> Self {
        Self::from_delta(-self.delta())
    }

    pub fn is_up(self) -> bool {
        self.delta().y < 0
    }

    pub fn is_down(self) -> bool {
        self.delta().y > 0
    }
}

/// Which mirror to try first when a step is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Flip the horizontal component first
    Horizontal,
    /// Flip the vertical component first
    Vertical,
}

/// Result of [`resolve_bounce`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounce {
    /// Direction to move in this step
    pub direction: Direction,
    /// Whether the original direction was blocked
    pub hit: bool,
}

/// Choose a direction whose next step is not blocked.
///
/// `blocked(delta)` answers whether moving by `delta` would overlap an obstacle, usually
/// via [`Entity::is_colliding_box`](super::entity::Entity::is_colliding_box) with `delta`
/// as the offset. Candidates are the current direction, the preferred mirror, the other
/// mirror and the reversal. If every candidate is blocked the mover stays still.
pub fn resolve_bounce(
    direction: Direction,
    prefer: Axis,
    mut blocked: impl FnMut(IVec2) -> bool,
) -> Bounce {
    if !blocked(direction.delta()) {
        return Bounce {
            direction,
            hit: false,
        };
    }

    let (first, second) = match prefer {
        Axis::Horizontal => (direction.flip_x(), direction.flip_y()),
        Axis::Vertical => (direction.flip_y(), direction.flip_x()),
    };

    let chosen = [first, second, direction.reverse()]
        .into_iter()
        .filter(|&candidate| candidate != direction && candidate != Direction::Still)
        .find(|candidate| !blocked(candidate.delta()))
        .unwrap_or(Direction::Still);

    Bounce {
        direction: chosen,
        hit: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollisionBox, Entity, sprite};
    use crate::sim::grid::BlockGrid;

    #[test]
    fn test_sprites_overlap() {
        let a = [IVec2::new(0, 0), IVec2::new(1, 0)];
        let b = [IVec2::new(1, 0)];
        assert!(sprites_overlap(a.into_iter(), b.into_iter()));
        assert!(!sprites_overlap(a.into_iter(), [IVec2::new(2, 0)].into_iter()));
        assert!(!sprites_overlap(a.into_iter(), std::iter::empty()));
    }

    #[test]
    fn test_box_exactness() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(!boxes_overlap(a, Rect::new(2, 0, 2, 2)));
        assert!(boxes_overlap(a, Rect::new(1, 0, 2, 2)));
    }

    #[test]
    fn test_direction_mirrors() {
        assert_eq!(Direction::UpLeft.flip_x(), Direction::UpRight);
        assert_eq!(Direction::UpLeft.flip_y(), Direction::DownLeft);
        assert_eq!(Direction::UpLeft.reverse(), Direction::DownRight);
        assert_eq!(Direction::UpStraight.flip_x(), Direction::UpStraight);
        assert_eq!(Direction::LeftStraight.flip_x(), Direction::RightStraight);
        assert_eq!(Direction::Still.reverse(), Direction::Still);
    }

    #[test]
    fn test_unblocked_direction_kept() {
        let bounce = resolve_bounce(Direction::DownRight, Axis::Vertical, |_| false);
        assert_eq!(bounce.direction, Direction::DownRight);
        assert!(!bounce.hit);
    }

    #[test]
    fn test_ball_reflects_off_paddle_edge() {
        let mut grid = BlockGrid::new(10, 20);
        let mut ball = Entity::new(&mut grid, 5, 1, sprite(&[(0, 0)]), Some(CollisionBox::sized(1, 1)));
        let paddle = Entity::new(&mut grid, 3, 0, sprite(&[(0, 0), (1, 0), (2, 0)]), Some(CollisionBox::sized(3, 1)));

        let direction = Direction::UpLeft;
        assert_eq!(direction.delta(), IVec2::new(-1, -1));
        assert!(ball.is_colliding_box(&paddle, direction.delta()));

        let bounce = resolve_bounce(direction, Axis::Horizontal, |delta| {
            ball.is_colliding_box(&paddle, delta)
        });
        assert!(bounce.hit);
        assert_eq!(bounce.direction, Direction::UpRight);

        let step = bounce.direction.delta();
        ball.move_relative(&mut grid, step.x, step.y);
        assert_eq!(ball.pos(), IVec2::new(6, 0));
        assert!(!ball.is_colliding_box(&paddle, IVec2::ZERO));
    }

    #[test]
    fn test_vertical_preference() {
        // Paddle under the ball: bounce back up
        let paddle = Rect::new(0, 5, 10, 1);
        let ball = IVec2::new(4, 4);
        let bounce = resolve_bounce(Direction::DownRight, Axis::Vertical, |delta| {
            paddle.contains_cell(ball + delta)
        });
        assert_eq!(bounce.direction, Direction::UpRight);
    }

    #[test]
    fn test_fully_blocked_stays_still() {
        let bounce = resolve_bounce(Direction::UpLeft, Axis::Horizontal, |_| true);
        assert!(bounce.hit);
        assert_eq!(bounce.direction, Direction::Still);
    }
}

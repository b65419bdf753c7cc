//! Positioned sprites on the block grid
//!
//! An [`Entity`] owns an anchor position and a sprite (cell offsets relative to the
//! anchor). Every mutation diffs the old placement against the new one and only touches
//! blocks that actually change, so a block shared by both placements is never written.

use std::collections::HashSet;

use glam::IVec2;

use super::collision;
use super::grid::{GridSurface, Rect};

/// Cell offsets relative to an entity anchor. Duplicates are allowed.
pub type Sprite = Vec<IVec2>;

/// Build a sprite from `(dx, dy)` pairs
pub fn sprite(cells: &[(i32, i32)]) -> Sprite {
    cells.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
}

/// Collision rectangle relative to the entity anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionBox {
    pub offset: IVec2,
    pub size: IVec2,
}

impl CollisionBox {
    pub const fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset: IVec2::new(offset_x, offset_y),
            size: IVec2::new(width, height),
        }
    }

    /// Box anchored at the entity origin
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Absolute rectangle for an entity anchored at `anchor`
    #[inline]
    pub fn at(&self, anchor: IVec2) -> Rect {
        let origin = anchor + self.offset;
        Rect::new(origin.x, origin.y, self.size.x, self.size.y)
    }
}

/// A sprite placed on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pos: IVec2,
    sprite: Sprite,
    collision_box: Option<CollisionBox>,
}

impl Entity {
    /// Create an entity and draw it immediately
    pub fn new(
        grid: &mut dyn GridSurface,
        x: i32,
        y: i32,
        sprite: Sprite,
        collision_box: Option<CollisionBox>,
    ) -> Self {
        let entity = Self {
            pos: IVec2::new(x, y),
            sprite,
            collision_box,
        };
        entity.draw(grid);
        entity
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn sprite(&self) -> &[IVec2] {
        &self.sprite
    }

    pub fn collision_box(&self) -> Option<CollisionBox> {
        self.collision_box
    }

    /// Absolute collision rectangle, if the entity has a box
    pub fn bounds(&self) -> Option<Rect> {
        self.collision_box.map(|b| b.at(self.pos))
    }

    /// Absolute cells covered by the sprite (not clipped to the grid)
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        placed(self.pos, &self.sprite)
    }

    /// Light every sprite block
    pub fn draw(&self, grid: &mut dyn GridSurface) {
        self.paint(grid, true);
    }

    /// Unlight every sprite block. Call this before dropping an entity.
    pub fn clear(&self, grid: &mut dyn GridSurface) {
        self.paint(grid, false);
    }

    fn paint(&self, grid: &mut dyn GridSurface, on: bool) {
        for cell in self.cells() {
            if grid.contains(cell) {
                grid.set_block(cell.x, cell.y, on);
            }
        }
    }

    /// Swap the sprite, writing only the blocks that differ
    pub fn update_sprite(&mut self, grid: &mut dyn GridSurface, new_sprite: Sprite) {
        apply_diff(
            grid,
            placed(self.pos, &self.sprite),
            placed(self.pos, &new_sprite),
        );
        self.sprite = new_sprite;
    }

    /// Move to an absolute anchor, writing only the blocks that differ
    pub fn move_to(&mut self, grid: &mut dyn GridSurface, x: i32, y: i32) {
        let target = IVec2::new(x, y);
        if target == self.pos {
            return;
        }
        apply_diff(
            grid,
            placed(self.pos, &self.sprite),
            placed(target, &self.sprite),
        );
        self.pos = target;
    }

    /// Move by a relative amount
    pub fn move_relative(&mut self, grid: &mut dyn GridSurface, dx: i32, dy: i32) {
        if dx != 0 || dy != 0 {
            self.move_to(grid, self.pos.x + dx, self.pos.y + dy);
        }
    }

    /// Pixel-exact collision. `offset` shifts this entity only, so callers can test
    /// a future position without moving.
    pub fn is_colliding(&self, other: &Entity, offset: IVec2) -> bool {
        collision::sprites_overlap(placed(self.pos + offset, &self.sprite), other.cells())
    }

    /// Box collision. False when either entity has no collision box.
    pub fn is_colliding_box(&self, other: &Entity, offset: IVec2) -> bool {
        match (self.collision_box, other.collision_box) {
            (Some(mine), Some(theirs)) => {
                collision::boxes_overlap(mine.at(self.pos + offset), theirs.at(other.pos))
            }
            _ => false,
        }
    }
}

/// Sprite cells translated to an anchor
fn placed(anchor: IVec2, sprite: &[IVec2]) -> impl Iterator<Item = IVec2> + '_ {
    sprite.iter().map(move |&offset| anchor + offset)
}

/// Order-preserving dedup of in-bounds cells
fn visible_cells(
    grid: &dyn GridSurface,
    cells: impl Iterator<Item = IVec2>,
) -> (Vec<IVec2>, HashSet<IVec2>) {
    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    for cell in cells {
        if grid.contains(cell) && seen.insert(cell) {
            ordered.push(cell);
        }
    }
    (ordered, seen)
}

/// Unlight `old - new`, then light `new - old`. Cells in both sets are never written.
fn apply_diff(
    grid: &mut dyn GridSurface,
    old: impl Iterator<Item = IVec2>,
    new: impl Iterator<Item = IVec2>,
) {
    let (old_cells, old_set) = visible_cells(&*grid, old);
    let (new_cells, new_set) = visible_cells(&*grid, new);

    for cell in old_cells.iter().filter(|c| !new_set.contains(c)) {
        grid.set_block(cell.x, cell.y, false);
    }
    for cell in new_cells.iter().filter(|c| !old_set.contains(c)) {
        grid.set_block(cell.x, cell.y, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::BlockGrid;
    use crate::sim::grid::testing::RecordingGrid;
    use proptest::prelude::*;

    fn lit_set(grid: &BlockGrid) -> HashSet<IVec2> {
        grid.lit_cells().into_iter().collect()
    }

    fn footprint(entity: &Entity, width: i32, height: i32) -> HashSet<IVec2> {
        entity
            .cells()
            .filter(|c| c.x >= 0 && c.y >= 0 && c.x < width && c.y < height)
            .collect()
    }

    #[test]
    fn test_new_draws_sprite() {
        let mut grid = BlockGrid::new(10, 20);
        let entity = Entity::new(&mut grid, 2, 3, sprite(&[(0, 0), (1, 0)]), None);
        assert!(grid.is_lit(2, 3));
        assert!(grid.is_lit(3, 3));
        assert_eq!(grid.lit_count(), 2);

        entity.clear(&mut grid);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_move_to_same_position_writes_nothing() {
        let mut grid = RecordingGrid::new(10, 20);
        let mut entity = Entity::new(&mut grid, 4, 4, sprite(&[(0, 0), (0, 1)]), None);
        grid.reset_log();

        entity.move_to(&mut grid, 4, 4);
        entity.move_relative(&mut grid, 0, 0);
        assert!(grid.writes.is_empty());
    }

    #[test]
    fn test_move_only_touches_changed_cells() {
        let mut grid = RecordingGrid::new(10, 20);
        // Vertical bar of three
        let mut entity = Entity::new(&mut grid, 1, 1, sprite(&[(0, 0), (0, 1), (0, 2)]), None);
        grid.reset_log();

        entity.move_relative(&mut grid, 0, 1);
        assert_eq!(grid.turned_off(), vec![IVec2::new(1, 1)]);
        assert_eq!(grid.turned_on(), vec![IVec2::new(1, 4)]);
        assert_eq!(entity.pos(), IVec2::new(1, 2));
    }

    #[test]
    fn test_update_sprite_keeps_shared_cells() {
        let mut grid = RecordingGrid::new(10, 20);
        let mut entity = Entity::new(&mut grid, 0, 0, sprite(&[(0, 0), (1, 0)]), None);
        grid.reset_log();

        entity.update_sprite(&mut grid, sprite(&[(1, 0), (2, 0), (2, 0)]));
        assert_eq!(grid.turned_off(), vec![IVec2::new(0, 0)]);
        assert_eq!(grid.turned_on(), vec![IVec2::new(2, 0)]);
        assert_eq!(lit_set(&grid.grid), footprint(&entity, 10, 20));
    }

    #[test]
    fn test_duplicate_offsets_do_not_unlight_twice() {
        let mut grid = RecordingGrid::new(10, 20);
        let mut entity = Entity::new(&mut grid, 0, 0, sprite(&[(0, 0), (0, 0)]), None);
        grid.reset_log();

        entity.move_to(&mut grid, 1, 0);
        assert_eq!(grid.turned_off(), vec![IVec2::new(0, 0)]);
        assert_eq!(grid.turned_on(), vec![IVec2::new(1, 0)]);
    }

    #[test]
    fn test_move_clips_at_boundary() {
        let mut grid = RecordingGrid::new(10, 20);
        let mut entity = Entity::new(&mut grid, 9, 5, sprite(&[(0, 0)]), None);
        grid.reset_log();

        entity.move_to(&mut grid, 10, 5);
        assert!(!grid.writes.contains(&(IVec2::new(10, 5), true)));
        assert_eq!(grid.turned_off(), vec![IVec2::new(9, 5)]);
        assert_eq!(grid.grid.lit_count(), 0);

        // Coming back draws again
        entity.move_to(&mut grid, 9, 5);
        assert!(grid.grid.is_lit(9, 5));
    }

    #[test]
    fn test_is_colliding_with_offset() {
        let mut grid = BlockGrid::new(10, 20);
        let a = Entity::new(&mut grid, 0, 0, sprite(&[(0, 0)]), None);
        let b = Entity::new(&mut grid, 1, 1, sprite(&[(0, 0)]), None);

        assert!(!a.is_colliding(&b, IVec2::ZERO));
        assert!(a.is_colliding(&b, IVec2::new(1, 1)));
        // Offset applies to self only
        assert!(!b.is_colliding(&a, IVec2::new(1, 1)));
    }

    #[test]
    fn test_is_colliding_box() {
        let mut grid = BlockGrid::new(10, 20);
        let a = Entity::new(&mut grid, 0, 0, sprite(&[(0, 0)]), Some(CollisionBox::sized(2, 2)));
        let touching = Entity::new(&mut grid, 2, 0, sprite(&[(0, 0)]), Some(CollisionBox::sized(2, 2)));
        let overlapping = Entity::new(&mut grid, 1, 0, sprite(&[(0, 0)]), Some(CollisionBox::sized(2, 2)));
        let boxless = Entity::new(&mut grid, 0, 0, sprite(&[(0, 0)]), None);

        assert!(!a.is_colliding_box(&touching, IVec2::ZERO));
        assert!(a.is_colliding_box(&overlapping, IVec2::ZERO));
        assert!(a.is_colliding_box(&touching, IVec2::new(1, 0)));
        assert!(!a.is_colliding_box(&boxless, IVec2::ZERO));
        assert!(!boxless.is_colliding_box(&a, IVec2::ZERO));
    }

    #[test]
    fn test_box_offset_relative_to_anchor() {
        let mut grid = BlockGrid::new(10, 20);
        let a = Entity::new(&mut grid, 0, 0, Vec::new(), Some(CollisionBox::new(3, 0, 1, 1)));
        let b = Entity::new(&mut grid, 3, 0, Vec::new(), Some(CollisionBox::sized(1, 1)));
        assert!(a.is_colliding_box(&b, IVec2::ZERO));
        assert_eq!(a.bounds(), Some(Rect::new(3, 0, 1, 1)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(i32, i32),
        Relative(i32, i32),
        Sprite(Vec<(i32, i32)>),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-3..13i32, -3..13i32).prop_map(|(x, y)| Op::Move(x, y)),
            (-2..3i32, -2..3i32).prop_map(|(dx, dy)| Op::Relative(dx, dy)),
            prop::collection::vec((-2..4i32, -2..4i32), 0..8).prop_map(Op::Sprite),
        ]
    }

    proptest! {
        #[test]
        fn prop_lit_cells_match_footprint(
            start in prop::collection::vec((-2..4i32, -2..4i32), 0..8),
            ops in prop::collection::vec(op_strategy(), 1..20),
        ) {
            let mut grid = RecordingGrid::new(10, 10);
            let start = start.iter().map(|&(x, y)| IVec2::new(x, y)).collect();
            let mut entity = Entity::new(&mut grid, 4, 4, start, None);
            prop_assert_eq!(lit_set(&grid.grid), footprint(&entity, 10, 10));

            for op in ops {
                grid.reset_log();
                match op {
                    Op::Move(x, y) => entity.move_to(&mut grid, x, y),
                    Op::Relative(dx, dy) => entity.move_relative(&mut grid, dx, dy),
                    Op::Sprite(cells) => entity.update_sprite(&mut grid, sprite(&cells)),
                }

                // Shadow model: lit cells equal the in-bounds footprint
                prop_assert_eq!(lit_set(&grid.grid), footprint(&entity, 10, 10));

                // No cell is both turned off and on in one transition
                let off: HashSet<_> = grid.turned_off().into_iter().collect();
                let on: HashSet<_> = grid.turned_on().into_iter().collect();
                prop_assert!(off.is_disjoint(&on));

                // No out-of-bounds writes, no repeated writes
                prop_assert!(grid.writes.iter().all(|(p, _)| grid.grid.contains(*p)));
                prop_assert_eq!(off.len() + on.len(), grid.writes.len());
            }
        }
    }
}

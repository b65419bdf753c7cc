//! Grid surface: the shared matrix of lit/unlit blocks every entity draws into.
//!
//! Coordinates are (x, y) with x growing to the right and y growing downwards.
//! The surface never panics on out-of-bounds writes, it just ignores them.

use glam::IVec2;

/// Anything entities can draw blocks onto
pub trait GridSurface {
    /// Number of columns
    fn width(&self) -> i32;

    /// Number of rows
    fn height(&self) -> i32;

    /// Light or unlight a single block. Out-of-bounds coordinates are a no-op.
    fn set_block(&mut self, x: i32, y: i32, on: bool);

    /// Whether `pos` lies inside the grid
    #[inline]
    fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }

    /// Unlight every in-bounds block covered by `rect`
    fn clear_rect(&mut self, rect: Rect) {
        for cell in rect.cells() {
            if self.contains(cell) {
                self.set_block(cell.x, cell.y, false);
            }
        }
    }
}

/// Axis-aligned rectangle in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Same rectangle moved by `offset`
    #[inline]
    pub fn translate(self, offset: IVec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self
        }
    }

    /// Strict overlap test. Rectangles that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether a cell lies inside the rectangle
    #[inline]
    pub fn contains_cell(&self, cell: IVec2) -> bool {
        cell.x >= self.left() && cell.x < self.right() && cell.y >= self.top() && cell.y < self.bottom()
    }

    /// Every cell covered by the rectangle, row by row
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let Rect {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height).flat_map(move |row| (x..x + width).map(move |col| IVec2::new(col, row)))
    }
}

/// In-memory block grid used by hosts and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    width: i32,
    height: i32,
    /// Row-major (y * width + x)
    cells: Vec<bool>,
}

impl BlockGrid {
    /// Create an empty grid. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Change dimensions. All blocks are unlit afterwards.
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Self::new(width, height);
    }

    /// Unlight every block
    pub fn clear_all(&mut self) {
        self.cells.fill(false);
    }

    /// Whether the block at (x, y) is lit. Out-of-bounds reads are unlit.
    pub fn is_lit(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Number of lit blocks
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&on| on).count()
    }

    /// All lit cells in row-major order
    pub fn lit_cells(&self) -> Vec<IVec2> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| IVec2::new(x, y)))
            .filter(|p| self.is_lit(p.x, p.y))
            .collect()
    }

    /// Text rendering, one line per row
    pub fn render(&self, lit: char, unlit: char) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.is_lit(x, y) { lit } else { unlit });
            }
            out.push('\n');
        }
        out
    }
}

impl GridSurface for BlockGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn set_block(&mut self, x: i32, y: i32, on: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = on;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_block_out_of_bounds_is_noop() {
        let mut grid = BlockGrid::new(10, 20);
        grid.set_block(-1, 0, true);
        grid.set_block(10, 0, true);
        grid.set_block(0, 20, true);
        assert_eq!(grid.lit_count(), 0);

        grid.set_block(9, 19, true);
        assert!(grid.is_lit(9, 19));
        assert!(!grid.is_lit(10, 19));
    }

    #[test]
    fn test_clear_rect_clips_to_grid() {
        let mut grid = BlockGrid::new(4, 4);
        for cell in Rect::new(0, 0, 4, 4).cells() {
            grid.set_block(cell.x, cell.y, true);
        }
        grid.clear_rect(Rect::new(2, 2, 5, 5));
        assert_eq!(grid.lit_count(), 12);
        assert!(!grid.is_lit(3, 3));
        assert!(grid.is_lit(1, 3));
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(!a.overlaps(&Rect::new(2, 0, 2, 2)));
        assert!(a.overlaps(&Rect::new(1, 0, 2, 2)));
        assert!(!a.overlaps(&Rect::new(0, 2, 2, 2)));
        assert!(a.overlaps(&Rect::new(-1, -1, 2, 2)));
    }

    #[test]
    fn test_rect_cells_row_major() {
        let cells: Vec<_> = Rect::new(1, 1, 2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![
                IVec2::new(1, 1),
                IVec2::new(2, 1),
                IVec2::new(1, 2),
                IVec2::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_render() {
        let mut grid = BlockGrid::new(3, 2);
        grid.set_block(1, 0, true);
        assert_eq!(grid.render('#', '.'), ".#.\n...\n");
    }
}

//! Block-font glyphs: two-digit numbers and spinning letters for the game menu

use glam::IVec2;

use crate::sim::animation::{AnimatedFrames, Animation};
use crate::sim::entity::Sprite;
use crate::sim::grid::GridSurface;

/// 3x5 digits, one string per row
const DIGITS: [[&str; 5]; 10] = [
    ["###", "#.#", "#.#", "#.#", "###"],
    [".#.", "##.", ".#.", ".#.", "###"],
    ["###", "..#", "###", "#..", "###"],
    ["###", "..#", "###", "..#", "###"],
    ["#.#", "#.#", "###", "..#", "..#"],
    ["###", "#..", "###", "..#", "###"],
    ["###", "#..", "###", "#.#", "###"],
    ["###", "..#", "..#", "..#", "..#"],
    ["###", "#.#", "###", "#.#", "###"],
    ["###", "#.#", "###", "..#", "###"],
];

/// 5x5 letters `a` to `f`
const LETTERS: [[&str; 5]; 6] = [
    [".###.", "#...#", "#####", "#...#", "#...#"],
    ["####.", "#...#", "####.", "#...#", "####."],
    [".####", "#....", "#....", "#....", ".####"],
    ["####.", "#...#", "#...#", "#...#", "####."],
    ["#####", "#....", "####.", "#....", "#####"],
    ["#####", "#....", "####.", "#....", "#...."],
];

const TENS_X: i32 = 1;
const ONES_X: i32 = 5;
const LETTER_X: i32 = 1;
/// Column the letter spins around
const LETTER_AXIS: i32 = LETTER_X + 2;

pub const LETTER_SPIN_DELAY: f64 = 80.0;
/// Horizontal scale per frame: edge-on, mirrored, edge-on again, then face-on
const SPIN_SCALES: [f32; 7] = [0.0, -0.5, -1.0, -0.5, 0.0, 0.5, 1.0];

fn lit(row: &str) -> impl Iterator<Item = i32> + '_ {
    row.bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'#')
        .map(|(i, _)| i as i32)
}

/// Two-digit number, e.g. `01`. Values above 99 keep their last two digits.
pub fn number_sprite(value: u8) -> Sprite {
    let tens = &DIGITS[usize::from(value / 10 % 10)];
    let ones = &DIGITS[usize::from(value % 10)];
    (0..5)
        .flat_map(|y| {
            let left = lit(tens[y]).map(move |x| IVec2::new(TENS_X + x, y as i32));
            let right = lit(ones[y]).map(move |x| IVec2::new(ONES_X + x, y as i32));
            left.chain(right)
        })
        .collect()
}

/// Letter glyph, or `None` for characters without one
pub fn letter_sprite(letter: char) -> Option<Sprite> {
    let index = (letter.to_ascii_lowercase() as u32).checked_sub('a' as u32)? as usize;
    let rows = LETTERS.get(index)?;
    Some(
        rows.iter()
            .enumerate()
            .flat_map(|(y, row)| lit(row).map(move |x| IVec2::new(LETTER_X + x, y as i32)))
            .collect(),
    )
}

/// Squeeze a sprite horizontally around `axis`
fn squeeze(sprite: &[IVec2], axis: i32, scale: f32) -> Sprite {
    sprite
        .iter()
        .map(|c| IVec2::new(axis + ((c.x - axis) as f32 * scale).round() as i32, c.y))
        .collect()
}

fn spin_frames(glyph: &[IVec2]) -> Vec<Sprite> {
    SPIN_SCALES
        .iter()
        .map(|&scale| squeeze(glyph, LETTER_AXIS, scale))
        .collect()
}

/// Letter that spins into view, ending face-on
pub fn letter_reveal(grid: &mut dyn GridSurface, letter: char, x: i32, y: i32) -> Option<AnimatedFrames> {
    let frames = spin_frames(&letter_sprite(letter)?);
    Some(AnimatedFrames::from_frames(grid, x, y, frames, LETTER_SPIN_DELAY))
}

/// The reveal as a descriptor, for callers that build it later
pub fn letter_animation(letter: char) -> Option<Animation> {
    Some(Animation::Framed {
        frames: spin_frames(&letter_sprite(letter)?),
        delay: LETTER_SPIN_DELAY,
        looping: false,
    })
}

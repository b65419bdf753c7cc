//! Block Arcade - retro games on a low-resolution LED block grid
//!
//! Core modules:
//! - `sim`: Grid, entities, timers, animations and the brain contract
//! - `games`: The bundled games, menu and splash screen
//! - `arcade`: Host loop switching between brains
//! - `platform`: Keyboard, gamepad and modal collaborators
//! - `audio`: Sound effect playback
//! - `persistence`: Key/value storage for settings, hi-scores and pad pairing

pub mod arcade;
pub mod audio;
pub mod context;
pub mod games;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use arcade::Arcade;
pub use context::{AppContext, BrainContext};
pub use highscores::HiScores;
pub use settings::Settings;

use std::fmt::Display;

/// Grid configuration constants
pub mod consts {
    /// Main grid, in blocks
    pub const GRID_WIDTH: i32 = 10;
    pub const GRID_HEIGHT: i32 = 20;
    /// Square side-panel grid for lives and previews
    pub const MINI_GRID_SIZE: i32 = 4;
}

/// Left-pad `value` with `fill` up to `width` characters. Longer values are kept whole.
pub fn pad(value: impl Display, width: usize, fill: char) -> String {
    let text = value.to_string();
    let missing = width.saturating_sub(text.chars().count());
    let mut out = String::with_capacity(text.len() + missing);
    out.extend(std::iter::repeat_n(fill, missing));
    out.push_str(&text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad() {
        assert_eq!(pad(7, 3, ' '), "  7");
        assert_eq!(pad(42, 3, '!'), "!42");
        assert_eq!(pad(1234, 3, ' '), "1234");
        assert_eq!(pad("", 2, '0'), "00");
    }
}

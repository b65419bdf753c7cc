//! Ready-made animations: explosions, screen transitions, decorative effects and glyphs

pub mod explosion;
pub mod flash;
pub mod glyphs;
pub mod swirl;
pub mod wipe;

pub use explosion::{EXPLOSION_DELAY, EXPLOSION_SIZE, explosion, explosion_frames, place_explosion};
pub use flash::FlashEffect;
pub use glyphs::{letter_animation, letter_reveal, letter_sprite, number_sprite};
pub use swirl::{SWIRL_DELAY, SwirlEffect};
pub use wipe::{DEFAULT_WIPE_DELAY, WipeDirection, wipe, wipe_frames};

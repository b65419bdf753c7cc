//! Host-driven input collaborators
//!
//! The host feeds raw events (key presses, gamepad snapshots, modal answers) in; brains
//! poll levels or drain the edge events queued for the listeners they registered.
//! Nothing here calls back into game code.

pub mod gamepad;
pub mod keyboard;
pub mod modal;

pub use gamepad::{Button, GamepadSnapshot, Gamepads, Rumble, STICK_DEAD_ZONE, StickAxis};
pub use keyboard::{Key, Keyboard};
pub use modal::{Modal, ModalId, ModalQueue};

/// Handle returned when registering a listener, used to drain and remove it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

impl ListenerId {
    pub(crate) fn next(counter: &mut u32) -> Self {
        *counter = counter.wrapping_add(1);
        Self(*counter)
    }
}

/// Which transition a listener wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Down,
    Up,
}

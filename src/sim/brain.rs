//! Game controller contract
//!
//! A [`Brain`] owns one game's entities and rules. The host drives it through
//! `start -> update* -> stop` and hands it a [`BrainContext`] each call.
//!
//! ```text
//! Created --start--> Started --qualifying input--> Running
//!                       ^                              |
//!                       +---------- restart -----------+
//!                       any state --stop--> Stopped (terminal)
//! ```

use glam::IVec2;

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::context::BrainContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrainState {
    #[default]
    Created,
    /// Set up and waiting for the first qualifying input
    Started,
    Running,
    Stopped,
}

impl BrainState {
    /// Whether `update` has anything to do
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, BrainState::Started | BrainState::Running)
    }
}

/// Observable score text with a revision counter so hosts can redraw only on change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Score {
    text: String,
    revision: u64,
}

impl Score {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the text. The revision only moves when the text changes.
    pub fn set(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.revision += 1;
        }
    }
}

/// One game or screen
pub trait Brain {
    /// Stable identifier, also the hi-score key prefix
    fn id(&self) -> &str;

    /// Main grid size this brain wants
    fn grid_size(&self) -> IVec2 {
        IVec2::new(GRID_WIDTH, GRID_HEIGHT)
    }

    fn state(&self) -> BrainState;

    /// Score display, for brains that keep one
    fn score(&self) -> Option<&Score> {
        None
    }

    /// One-time setup. Leaves the brain `Started`.
    fn start(&mut self, ctx: &mut BrainContext<'_>);

    /// Advance to `now` (milliseconds). A no-op unless started or running.
    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64);

    /// Clear owned entities and release listeners. Calling it twice is harmless.
    fn stop(&mut self, ctx: &mut BrainContext<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_revision_only_moves_on_change() {
        let mut score = Score::new("000");
        score.set("000");
        assert_eq!(score.revision(), 0);

        score.set("100");
        assert_eq!(score.text(), "100");
        assert_eq!(score.revision(), 1);
    }

    #[test]
    fn test_active_states() {
        assert!(!BrainState::Created.is_active());
        assert!(BrainState::Started.is_active());
        assert!(BrainState::Running.is_active());
        assert!(!BrainState::Stopped.is_active());
    }
}

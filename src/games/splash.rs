//! Title screen: the arcade name, with a swirl/flash loop playing around it until a key is hit

use crate::context::BrainContext;
use crate::platform::Button;
use crate::sim::brain::{Brain, BrainState};
use crate::sim::effects::{FlashEffect, SwirlEffect};
use crate::sim::entity::{Sprite, sprite};

pub const ID: &str = "splash";

const FLASH_DELAY: f64 = 439.0;
const FLASH_TIMES: u32 = 9;

fn title_sprite() -> Sprite {
    sprite(&[
        (1, 1), (2, 1), (5, 1), (6, 1),
        (1, 2), (3, 2), (5, 2), (7, 2),
        (1, 3), (2, 3), (5, 3), (6, 3),
        (1, 4), (3, 4), (5, 4), (7, 4),
        (1, 5), (2, 5), (5, 5), (7, 5),
        (1, 7), (2, 7), (3, 7), (6, 7), (7, 7),
        (2, 8), (5, 8),
        (2, 9), (5, 9),
        (2, 10), (5, 10),
        (1, 11), (2, 11), (3, 11), (6, 11), (7, 11),
        (1, 13), (3, 13), (6, 13), (7, 13),
        (1, 14), (3, 14), (5, 14),
        (1, 15), (2, 15), (6, 15),
        (1, 16), (3, 16), (7, 16),
        (1, 17), (3, 17), (5, 17), (6, 17),
    ])
}

/// Decoration currently playing. Each phase owns its effect.
#[derive(Debug)]
enum Phase {
    Swirl(SwirlEffect),
    Flash { effect: FlashEffect, lit: bool },
}

#[derive(Debug, Default)]
pub struct SplashScreen {
    state: BrainState,
    phase: Option<Phase>,
    /// Whether the next flash starts with the title lit
    next_flash_lit: bool,
}

impl SplashScreen {
    pub fn new() -> Self {
        Self {
            next_flash_lit: true,
            ..Self::default()
        }
    }

    fn swirl(ctx: &BrainContext<'_>) -> Phase {
        Phase::Swirl(SwirlEffect::new(ctx.grid.width(), ctx.grid.height()))
    }

    fn advance_phase(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        let phase = self.phase.get_or_insert_with(|| Self::swirl(ctx));

        let finished = match phase {
            Phase::Swirl(swirl) => {
                swirl.update(ctx.grid, now);
                swirl.is_finished()
            }
            Phase::Flash { effect, .. } => {
                effect.update(ctx.grid, now);
                effect.is_finished()
            }
        };
        if !finished {
            return;
        }

        self.phase = Some(match phase {
            Phase::Swirl(_) => {
                let lit = self.next_flash_lit;
                self.next_flash_lit = !lit;
                Phase::Flash {
                    effect: FlashEffect::new(ctx.grid, title_sprite(), FLASH_DELAY, FLASH_TIMES, lit),
                    lit,
                }
            }
            Phase::Flash { lit, .. } => {
                log::trace!("Splash flash (lit={lit}) done");
                Self::swirl(ctx)
            }
        });
    }
}

impl Brain for SplashScreen {
    fn id(&self) -> &str {
        ID
    }

    fn state(&self) -> BrainState {
        self.state
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        for cell in title_sprite() {
            ctx.grid.set_block(cell.x, cell.y, true);
        }
        self.state = BrainState::Started;
    }

    fn update(&mut self, ctx: &mut BrainContext<'_>, now: f64) {
        if self.state == BrainState::Started {
            self.state = BrainState::Running;
        }
        if self.state != BrainState::Running {
            return;
        }

        if ctx.keyboard.is_down(None)
            || ctx.gamepads.is_button_down(Button::Start, None)
            || ctx.gamepads.is_button_down(Button::A, None)
        {
            self.stop(ctx);
            return;
        }

        if ctx.settings.effective_decorations() {
            self.advance_phase(ctx, now);
        }
    }

    fn stop(&mut self, _ctx: &mut BrainContext<'_>) {
        self.phase = None;
        if self.state != BrainState::Stopped {
            log::info!("Splash screen stopped");
            self.state = BrainState::Stopped;
        }
    }
}

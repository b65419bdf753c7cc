//! Block grid engine
//!
//! Everything a game is built from, independent of any platform:
//! - `grid`: the lit/unlit block surface
//! - `entity`, `collision`: sprites placed on the grid and how they touch
//! - `timer`, `animation`, `effects`: time-stepped movement and canned animations
//! - `brain`, `loader`: the game contract and the cancelable game registry
//!
//! Nothing in here reads the clock or the keyboard directly; timestamps and input arrive
//! through the callers.

pub mod animation;
pub mod brain;
pub mod collision;
pub mod effects;
pub mod entity;
pub mod grid;
pub mod loader;
pub mod timer;

pub use animation::{AnimatedFrames, Animation, AnimationError, AnimationState, Animator};
pub use brain::{Brain, BrainState, Score};
pub use collision::{Axis, Bounce, Direction, resolve_bounce};
pub use entity::{CollisionBox, Entity, Sprite, sprite};
pub use grid::{BlockGrid, GridSurface, Rect};
pub use loader::{CancelHandle, GameFactory, GameRegistry, LoadError, MenuArt, PendingLoad};
pub use timer::StepTimer;

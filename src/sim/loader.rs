//! Game registry and cancelable loads
//!
//! Games and their menu art are fetched through futures so a backend can load them lazily.
//! Every load is wrapped in a [`Cancelable`] tied to a [`CancelHandle`]; once the handle
//! fires the load resolves to [`LoadError::Canceled`] and its result is never observed.
//! There is no executor: the owner polls a [`PendingLoad`] once per frame.

use std::cell::Cell;
use std::future::{self, Future};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use thiserror::Error;

use super::animation::Animation;
use super::brain::Brain;
use super::effects::letter_animation;
use super::entity::Sprite;
use super::grid::Rect;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The load was superseded. Never worth reporting.
    #[error("load canceled")]
    Canceled,
    #[error("unknown game: {0}")]
    UnknownGame(String),
    #[error("load failed: {0}")]
    Failed(String),
}

impl LoadError {
    #[inline]
    pub fn is_canceled(&self) -> bool {
        matches!(self, LoadError::Canceled)
    }
}

pub type LoadFuture<T> = Pin<Box<dyn Future<Output = Result<T, LoadError>>>>;

/// Builds a fresh brain for a game
pub type GameFactory = fn() -> Box<dyn Brain>;

/// Shared cancel flag
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.get()
    }
}

/// Future that resolves to `Canceled` once its handle fires
pub struct Cancelable<T> {
    inner: LoadFuture<T>,
    handle: CancelHandle,
}

impl<T> Cancelable<T> {
    pub fn new(inner: LoadFuture<T>, handle: CancelHandle) -> Self {
        Self { inner, handle }
    }
}

impl<T> Future for Cancelable<T> {
    type Output = Result<T, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.handle.is_canceled() {
            return Poll::Ready(Err(LoadError::Canceled));
        }
        self.inner.as_mut().poll(cx)
    }
}

/// A load in flight, polled by its owner once per frame
pub struct PendingLoad<T> {
    future: Option<Cancelable<T>>,
    handle: CancelHandle,
}

impl<T> PendingLoad<T> {
    pub fn new(inner: LoadFuture<T>) -> Self {
        let handle = CancelHandle::new();
        Self {
            future: Some(Cancelable::new(inner, handle.clone())),
            handle,
        }
    }

    /// A load that is already resolved
    pub fn ready(result: Result<T, LoadError>) -> Self
    where
        T: 'static,
    {
        Self::new(Box::pin(future::ready(result)))
    }

    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Whether the result has been taken
    pub fn is_done(&self) -> bool {
        self.future.is_none()
    }

    /// Poll once. `Some` exactly once, when the load resolves.
    pub fn poll(&mut self) -> Option<Result<T, LoadError>> {
        let future = self.future.as_mut()?;
        let mut cx = Context::from_waker(Waker::noop());
        match Pin::new(future).poll(&mut cx) {
            Poll::Ready(result) => {
                self.future = None;
                Some(result)
            }
            Poll::Pending => None,
        }
    }
}

/// Picture a game shows on the menu while it is selected
#[derive(Debug, Clone, PartialEq)]
pub struct MenuArt {
    pub x: i32,
    pub y: i32,
    pub sprite: Sprite,
    pub animation: Animation,
    /// Region blanked before the art is drawn
    pub clear_square: Option<Rect>,
}

type Loader<T> = Box<dyn Fn() -> LoadFuture<T>>;

struct Entry {
    id: String,
    name: String,
    game: Loader<GameFactory>,
    menu_art: Loader<MenuArt>,
}

/// Game id to loader map, in menu order
#[derive(Default)]
pub struct GameRegistry {
    entries: Vec<Entry>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game with its own loaders. A repeated id replaces the earlier entry.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        game: impl Fn() -> LoadFuture<GameFactory> + 'static,
        menu_art: impl Fn() -> LoadFuture<MenuArt> + 'static,
    ) {
        let entry = Entry {
            id: id.into(),
            name: name.into(),
            game: Box::new(game),
            menu_art: Box::new(menu_art),
        };
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Register a game whose factory and art are available immediately
    pub fn register_ready(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        factory: GameFactory,
        menu_art: fn() -> MenuArt,
    ) {
        self.register(
            id,
            name,
            move || Box::pin(future::ready(Ok(factory))),
            move || Box::pin(future::ready(Ok(menu_art()))),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Game ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.id.as_str())
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn load_game(&self, id: &str) -> PendingLoad<GameFactory> {
        match self.entry(id) {
            Some(entry) => PendingLoad::new((entry.game)()),
            None => PendingLoad::ready(Err(LoadError::UnknownGame(id.to_owned()))),
        }
    }

    pub fn load_menu_art(&self, id: &str) -> PendingLoad<MenuArt> {
        match self.entry(id) {
            Some(entry) => PendingLoad::new((entry.menu_art)()),
            None => PendingLoad::ready(Err(LoadError::UnknownGame(id.to_owned()))),
        }
    }

    /// Spinning reveal for a menu letter
    pub fn load_letter(&self, letter: char) -> PendingLoad<Animation> {
        PendingLoad::ready(
            letter_animation(letter).ok_or_else(|| LoadError::Failed(format!("no glyph for {letter:?}"))),
        )
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A load the test resolves by hand
    pub struct Deferred<T>(pub Rc<Cell<Option<T>>>);

    impl<T> Future for Deferred<T> {
        type Output = Result<T, LoadError>;

        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            match self.0.take() {
                Some(value) => Poll::Ready(Ok(value)),
                None => Poll::Pending,
            }
        }
    }

    pub fn deferred<T: 'static>() -> (Rc<Cell<Option<T>>>, LoadFuture<T>) {
        let slot = Rc::new(Cell::new(None));
        (slot.clone(), Box::pin(Deferred(slot)))
    }
}

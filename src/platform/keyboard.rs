//! Keyboard state with edge-triggered listeners

use std::collections::{HashMap, HashSet};

use super::{Edge, ListenerId};

/// Keys the games react to, named after DOM `KeyboardEvent.code` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Escape,
    KeyA,
    KeyD,
    KeyS,
    KeyW,
}

impl Key {
    pub fn code(self) -> &'static str {
        match self {
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::Space => "Space",
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::KeyA => "KeyA",
            Key::KeyD => "KeyD",
            Key::KeyS => "KeyS",
            Key::KeyW => "KeyW",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Space" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            "KeyA" => Key::KeyA,
            "KeyD" => Key::KeyD,
            "KeyS" => Key::KeyS,
            "KeyW" => Key::KeyW,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
struct Listener {
    key: Key,
    edge: Edge,
    pending: u32,
}

#[derive(Debug, Default)]
pub struct Keyboard {
    down: HashSet<Key>,
    /// Keys that went down since the last `end_frame`
    pressed: HashSet<Key>,
    listeners: HashMap<ListenerId, Listener>,
    next_id: u32,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down. Auto-repeat while held is ignored.
    pub fn press(&mut self, key: Key) {
        if !self.down.insert(key) {
            return;
        }
        self.pressed.insert(key);
        self.notify(key, Edge::Down);
    }

    /// Key went up
    pub fn release(&mut self, key: Key) {
        if self.down.remove(&key) {
            self.notify(key, Edge::Up);
        }
    }

    fn notify(&mut self, key: Key, edge: Edge) {
        for listener in self.listeners.values_mut() {
            if listener.key == key && listener.edge == edge {
                listener.pending += 1;
            }
        }
    }

    /// Whether `key` is held, or any key when `None`
    pub fn is_down(&self, key: Option<Key>) -> bool {
        match key {
            Some(key) => self.down.contains(&key),
            None => !self.down.is_empty(),
        }
    }

    /// Whether `key` went down during the current frame
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Whether any key went down during the current frame
    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }

    pub fn add_listener(&mut self, key: Key, edge: Edge) -> ListenerId {
        let id = ListenerId::next(&mut self.next_id);
        self.listeners.insert(
            id,
            Listener {
                key,
                edge,
                pending: 0,
            },
        );
        id
    }

    pub fn on_key_down(&mut self, key: Key) -> ListenerId {
        self.add_listener(key, Edge::Down)
    }

    pub fn on_key_up(&mut self, key: Key) -> ListenerId {
        self.add_listener(key, Edge::Up)
    }

    /// Number of events queued for `id` since the last drain. Unknown ids have none.
    pub fn drain(&mut self, id: ListenerId) -> u32 {
        self.listeners
            .get_mut(&id)
            .map(|l| std::mem::take(&mut l.pending))
            .unwrap_or(0)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forget per-frame edges. Called by the host after every frame.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

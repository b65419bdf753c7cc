//! Gamepad state fed from host snapshots
//!
//! Buttons and axes use the W3C "standard" gamepad layout indices.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::{Edge, ListenerId};

/// Stick values within this distance of zero count as centred
pub const STICK_DEAD_ZONE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Home,
}

impl Button {
    /// Index in the standard layout
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
}

impl StickAxis {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Raw state the host reads from the platform once per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
}

/// Last vibration request for a pad, for the host to act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rumble {
    pub intensity: f32,
    pub duration: f64,
}

#[derive(Debug, Clone)]
struct Pad {
    id: String,
    can_vibrate: bool,
    buttons_down: HashSet<usize>,
    axes: Vec<f32>,
    rumble: Option<Rumble>,
}

#[derive(Debug, Clone)]
struct ButtonListener {
    button: Button,
    edge: Edge,
    pad: Option<usize>,
    /// Pad indexes that produced an edge
    events: VecDeque<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connection {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone)]
struct ConnectionListener {
    kind: Connection,
    events: VecDeque<(usize, String)>,
}

#[derive(Debug, Default)]
pub struct Gamepads {
    pads: BTreeMap<usize, Pad>,
    button_listeners: HashMap<ListenerId, ButtonListener>,
    connection_listeners: HashMap<ListenerId, ConnectionListener>,
    next_id: u32,
}

impl Gamepads {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pad appeared at `index`. Replaces whatever was there before.
    pub fn connect(&mut self, index: usize, id: impl Into<String>, can_vibrate: bool) {
        let id = id.into();
        log::info!("Gamepad {index} connected: {id}");
        self.pads.insert(
            index,
            Pad {
                id: id.clone(),
                can_vibrate,
                buttons_down: HashSet::new(),
                axes: Vec::new(),
                rumble: None,
            },
        );
        self.notify_connection(Connection::Connected, index, &id);
    }

    pub fn disconnect(&mut self, index: usize) {
        if let Some(pad) = self.pads.remove(&index) {
            log::info!("Gamepad {index} disconnected");
            self.notify_connection(Connection::Disconnected, index, &pad.id);
        }
    }

    fn notify_connection(&mut self, kind: Connection, index: usize, id: &str) {
        for listener in self.connection_listeners.values_mut() {
            if listener.kind == kind {
                listener.events.push_back((index, id.to_owned()));
            }
        }
    }

    /// Apply a fresh snapshot, queueing button edges. Unknown pads are ignored.
    pub fn update(&mut self, index: usize, snapshot: &GamepadSnapshot) {
        let Some(pad) = self.pads.get_mut(&index) else {
            return;
        };

        let mut edges = Vec::new();
        for (button, &pressed) in snapshot.buttons.iter().enumerate() {
            let was_down = pad.buttons_down.contains(&button);
            if pressed && !was_down {
                pad.buttons_down.insert(button);
                edges.push((button, Edge::Down));
            } else if !pressed && was_down {
                pad.buttons_down.remove(&button);
                edges.push((button, Edge::Up));
            }
        }
        pad.axes.clone_from(&snapshot.axes);

        for (button, edge) in edges {
            for listener in self.button_listeners.values_mut() {
                if listener.button.index() == button
                    && listener.edge == edge
                    && listener.pad.is_none_or(|p| p == index)
                {
                    listener.events.push_back(index);
                }
            }
        }
    }

    pub fn is_connected(&self, index: usize) -> bool {
        self.pads.contains_key(&index)
    }

    /// Connected pad indexes in ascending order
    pub fn indexes(&self) -> Vec<usize> {
        self.pads.keys().copied().collect()
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.pads.get(&index).map(|p| p.id.as_str())
    }

    fn pads_matching(&self, pad: Option<usize>) -> impl Iterator<Item = (&usize, &Pad)> {
        self.pads.iter().filter(move |(i, _)| pad.is_none_or(|p| p == **i))
    }

    /// Whether `button` is held on `pad`, or on any pad when `None`
    pub fn is_button_down(&self, button: Button, pad: Option<usize>) -> bool {
        self.pressing_pad(button, pad).is_some()
    }

    /// First pad holding `button`
    pub fn pressing_pad(&self, button: Button, pad: Option<usize>) -> Option<usize> {
        self.pads_matching(pad)
            .find(|(_, p)| p.buttons_down.contains(&button.index()))
            .map(|(i, _)| *i)
    }

    fn axis_matches(&self, axis: StickAxis, pad: Option<usize>, test: impl Fn(f32) -> bool) -> bool {
        self.pads_matching(pad)
            .any(|(_, p)| p.axes.get(axis.index()).is_some_and(|v| test(*v)))
    }

    pub fn is_stick_positive(&self, axis: StickAxis, pad: Option<usize>) -> bool {
        self.axis_matches(axis, pad, |v| v > STICK_DEAD_ZONE)
    }

    pub fn is_stick_negative(&self, axis: StickAxis, pad: Option<usize>) -> bool {
        self.axis_matches(axis, pad, |v| v < -STICK_DEAD_ZONE)
    }

    pub fn can_vibrate(&self, index: usize) -> bool {
        self.pads.get(&index).is_some_and(|p| p.can_vibrate)
    }

    /// Request a rumble. False when the pad is unknown or has no actuator.
    pub fn vibrate(&mut self, index: usize, intensity: f32, duration: f64) -> bool {
        match self.pads.get_mut(&index) {
            Some(pad) if pad.can_vibrate => {
                pad.rumble = Some(Rumble {
                    intensity: intensity.clamp(0.0, 1.0),
                    duration: duration.max(0.0),
                });
                true
            }
            _ => false,
        }
    }

    /// Pending rumble for the host to play
    pub fn take_rumble(&mut self, index: usize) -> Option<Rumble> {
        self.pads.get_mut(&index).and_then(|p| p.rumble.take())
    }

    pub fn add_button_listener(&mut self, button: Button, edge: Edge, pad: Option<usize>) -> ListenerId {
        let id = ListenerId::next(&mut self.next_id);
        self.button_listeners.insert(
            id,
            ButtonListener {
                button,
                edge,
                pad,
                events: VecDeque::new(),
            },
        );
        id
    }

    /// Pad indexes that produced an edge since the last drain
    pub fn drain_buttons(&mut self, id: ListenerId) -> Vec<usize> {
        self.button_listeners
            .get_mut(&id)
            .map(|l| l.events.drain(..).collect())
            .unwrap_or_default()
    }

    /// Listen for new pads. With `replay`, pads already connected are queued immediately.
    pub fn add_connected_listener(&mut self, replay: bool) -> ListenerId {
        let events = if replay {
            self.pads.iter().map(|(i, p)| (*i, p.id.clone())).collect()
        } else {
            VecDeque::new()
        };
        self.insert_connection_listener(Connection::Connected, events)
    }

    pub fn add_disconnected_listener(&mut self) -> ListenerId {
        self.insert_connection_listener(Connection::Disconnected, VecDeque::new())
    }

    fn insert_connection_listener(
        &mut self,
        kind: Connection,
        events: VecDeque<(usize, String)>,
    ) -> ListenerId {
        let id = ListenerId::next(&mut self.next_id);
        self.connection_listeners
            .insert(id, ConnectionListener { kind, events });
        id
    }

    /// `(index, id)` pairs queued since the last drain
    pub fn drain_connections(&mut self, id: ListenerId) -> Vec<(usize, String)> {
        self.connection_listeners
            .get_mut(&id)
            .map(|l| l.events.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.button_listeners.remove(&id).is_some() || self.connection_listeners.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(buttons: &[Button]) -> GamepadSnapshot {
        let mut snapshot = GamepadSnapshot {
            buttons: vec![false; 17],
            axes: vec![0.0; 4],
        };
        for b in buttons {
            snapshot.buttons[b.index()] = true;
        }
        snapshot
    }

    #[test]
    fn test_button_levels_and_edges() {
        let mut pads = Gamepads::new();
        pads.connect(0, "pad-0", false);
        let down = pads.add_button_listener(Button::A, Edge::Down, None);
        let up = pads.add_button_listener(Button::A, Edge::Up, Some(0));

        pads.update(0, &pressed(&[Button::A]));
        pads.update(0, &pressed(&[Button::A]));
        assert!(pads.is_button_down(Button::A, None));
        assert!(pads.is_button_down(Button::A, Some(0)));
        assert!(!pads.is_button_down(Button::A, Some(1)));
        assert_eq!(pads.pressing_pad(Button::A, None), Some(0));
        assert_eq!(pads.drain_buttons(down), vec![0]);
        assert!(pads.drain_buttons(up).is_empty());

        pads.update(0, &pressed(&[]));
        assert_eq!(pads.drain_buttons(up), vec![0]);
        assert!(!pads.is_button_down(Button::A, None));
    }

    #[test]
    fn test_stick_dead_zone() {
        let mut pads = Gamepads::new();
        pads.connect(1, "pad-1", false);
        let mut snapshot = pressed(&[]);
        snapshot.axes[StickAxis::LeftStickX.index()] = 0.15;
        pads.update(1, &snapshot);
        assert!(!pads.is_stick_positive(StickAxis::LeftStickX, None));

        snapshot.axes[StickAxis::LeftStickX.index()] = -0.5;
        pads.update(1, &snapshot);
        assert!(pads.is_stick_negative(StickAxis::LeftStickX, Some(1)));
        assert!(!pads.is_stick_negative(StickAxis::LeftStickY, Some(1)));
    }

    #[test]
    fn test_vibrate_capability() {
        let mut pads = Gamepads::new();
        assert!(!pads.vibrate(0, 1.0, 100.0));

        pads.connect(0, "plain", false);
        pads.connect(1, "rumble", true);
        assert!(!pads.vibrate(0, 1.0, 100.0));
        assert!(pads.vibrate(1, 3.0, 120.0));
        assert_eq!(
            pads.take_rumble(1),
            Some(Rumble {
                intensity: 1.0,
                duration: 120.0
            })
        );
        assert_eq!(pads.take_rumble(1), None);
    }

    #[test]
    fn test_connection_listeners_and_replay() {
        let mut pads = Gamepads::new();
        pads.connect(0, "first", false);

        let fresh = pads.add_connected_listener(false);
        let replayed = pads.add_connected_listener(true);
        let gone = pads.add_disconnected_listener();
        assert!(pads.drain_connections(fresh).is_empty());
        assert_eq!(pads.drain_connections(replayed), vec![(0, "first".to_string())]);

        pads.connect(2, "second", true);
        assert_eq!(pads.drain_connections(fresh), vec![(2, "second".to_string())]);

        pads.disconnect(0);
        pads.disconnect(0);
        assert_eq!(pads.drain_connections(gone), vec![(0, "first".to_string())]);
        assert_eq!(pads.indexes(), vec![2]);

        assert!(pads.remove_listener(fresh));
        pads.connect(3, "third", false);
        assert!(pads.drain_connections(fresh).is_empty());
    }
}
